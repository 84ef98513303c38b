//! Process-wide SDK configuration.
//!
//! Callers usually set defaults once at startup via [`init`] and let every
//! façade pick them up; any façade argument can still override the global
//! value per call. Resolution order is always explicit argument, then global
//! default, then an error naming what was missing.

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AltusError, Result};
use crate::naming::parent_path;

/// Worker threads used by the deferred-execution pool when the caller does
/// not size it.
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// How the SDK authenticates against the platform.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Static API key, sent as `x-altus-api-key` metadata.
    ApiKey(String),
    /// OAuth-style bearer token, sent as `authorization` metadata.
    BearerToken(String),
}

impl Credentials {
    /// The metadata key/value pair attached to each RPC.
    pub(crate) fn metadata(&self) -> (&'static str, String) {
        match self {
            Self::ApiKey(key) => ("x-altus-api-key", key.clone()),
            Self::BearerToken(token) => ("authorization", format!("Bearer {token}")),
        }
    }
}

impl std::fmt::Debug for Credentials {
    // Secrets stay out of logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("Credentials::ApiKey(***)"),
            Self::BearerToken(_) => f.write_str("Credentials::BearerToken(***)"),
        }
    }
}

fn default_worker_threads() -> usize {
    DEFAULT_WORKER_THREADS
}

/// Global defaults consulted by every façade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default project id.
    #[serde(default)]
    pub project: Option<String>,

    /// Default location, e.g. `us-central1`.
    #[serde(default)]
    pub location: Option<String>,

    /// Credentials attached to every RPC. Unauthenticated when unset, which
    /// only works against local test backends.
    #[serde(skip)]
    pub credentials: Option<Credentials>,

    /// Customer-managed encryption key applied to created resources that do
    /// not specify their own.
    #[serde(default)]
    pub encryption_key: Option<String>,

    /// Size of the deferred-execution pool. Read once, when the pool starts.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Endpoint override. When unset the SDK derives
    /// `https://{location}-api.altus.dev` per call site.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            project: None,
            location: None,
            credentials: None,
            encryption_key: None,
            worker_threads: DEFAULT_WORKER_THREADS,
            endpoint: None,
        }
    }
}

impl GlobalConfig {
    /// Reads configuration from `ALTUS_*` environment variables. Unset or
    /// empty variables leave the corresponding default untouched.
    #[must_use]
    pub fn from_env() -> Self {
        fn non_empty(var: &str) -> Option<String> {
            std::env::var(var).ok().filter(|v| !v.is_empty())
        }

        let worker_threads = non_empty("ALTUS_WORKER_THREADS")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_WORKER_THREADS);

        Self {
            project: non_empty("ALTUS_PROJECT"),
            location: non_empty("ALTUS_LOCATION"),
            credentials: non_empty("ALTUS_API_KEY").map(Credentials::ApiKey),
            encryption_key: non_empty("ALTUS_ENCRYPTION_KEY"),
            worker_threads,
            endpoint: non_empty("ALTUS_ENDPOINT"),
        }
    }

    /// Resolves a project id: explicit argument first, then the default.
    ///
    /// # Errors
    /// Returns [`AltusError::BadArgument`] when neither is set.
    pub fn resolved_project(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.project.clone())
            .ok_or_else(|| missing("project"))
    }

    /// Resolves a location: explicit argument first, then the default.
    ///
    /// # Errors
    /// Returns [`AltusError::BadArgument`] when neither is set.
    pub fn resolved_location(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.location.clone())
            .ok_or_else(|| missing("location"))
    }

    /// Composes the `projects/{project}/locations/{location}` parent from
    /// explicit values and defaults.
    ///
    /// # Errors
    /// Returns [`AltusError::BadArgument`] when either piece is unresolved.
    pub fn common_parent(&self, project: Option<&str>, location: Option<&str>) -> Result<String> {
        let project = self.resolved_project(project)?;
        let location = self.resolved_location(location)?;
        Ok(parent_path(&project, &location))
    }

    /// The endpoint URL for a location, honouring the override.
    #[must_use]
    pub fn endpoint_for(&self, location: &str) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{location}-api.altus.dev"))
    }

    /// The default encryption spec for created resources, if any.
    #[must_use]
    pub fn encryption_spec(&self) -> Option<altus_proto::v1::EncryptionSpec> {
        self.encryption_key
            .clone()
            .map(|kms_key_name| altus_proto::v1::EncryptionSpec { kms_key_name })
    }
}

fn missing(what: &str) -> AltusError {
    AltusError::BadArgument(format!(
        "no {what} set: pass one explicitly or install a default via altus_sdk::init"
    ))
}

static GLOBAL: Lazy<RwLock<Arc<GlobalConfig>>> =
    Lazy::new(|| RwLock::new(Arc::new(GlobalConfig::default())));

/// Atomically replaces the process-wide configuration record.
///
/// Façades that already captured the previous record keep using it; new
/// calls observe the new one. There is no partial update.
pub fn init(config: GlobalConfig) {
    debug!(
        project = ?config.project,
        location = ?config.location,
        worker_threads = config.worker_threads,
        "Installing global SDK configuration"
    );
    *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
}

/// Returns the current configuration record.
#[must_use]
pub fn global() -> Arc<GlobalConfig> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_prefers_explicit_over_default() {
        let config = GlobalConfig {
            project: Some("default-prj".to_string()),
            location: Some("us-central1".to_string()),
            ..GlobalConfig::default()
        };

        assert_eq!(config.resolved_project(Some("explicit-prj")).unwrap(), "explicit-prj");
        assert_eq!(config.resolved_project(None).unwrap(), "default-prj");
        assert_eq!(config.resolved_location(None).unwrap(), "us-central1");
    }

    #[test]
    fn test_resolution_fails_when_nothing_is_set() {
        let config = GlobalConfig::default();
        let err = config.resolved_project(None).unwrap_err();
        match err {
            AltusError::BadArgument(msg) => assert!(msg.contains("project")),
            other => panic!("expected BadArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_common_parent_mixes_explicit_and_default() {
        let config = GlobalConfig {
            project: Some("p1".to_string()),
            location: Some("l1".to_string()),
            ..GlobalConfig::default()
        };

        assert_eq!(config.common_parent(None, None).unwrap(), "projects/p1/locations/l1");
        assert_eq!(
            config.common_parent(Some("p2"), None).unwrap(),
            "projects/p2/locations/l1"
        );
        assert_eq!(
            config.common_parent(None, Some("l2")).unwrap(),
            "projects/p1/locations/l2"
        );
    }

    #[test]
    fn test_endpoint_default_and_override() {
        let config = GlobalConfig::default();
        assert_eq!(config.endpoint_for("eu-west4"), "https://eu-west4-api.altus.dev");

        let config = GlobalConfig {
            endpoint: Some("https://localhost:8432".to_string()),
            ..GlobalConfig::default()
        };
        assert_eq!(config.endpoint_for("eu-west4"), "https://localhost:8432");
    }

    #[test]
    fn test_encryption_spec_from_key() {
        let config = GlobalConfig {
            encryption_key: Some("projects/p/keyRings/r/cryptoKeys/k".to_string()),
            ..GlobalConfig::default()
        };
        let spec = config.encryption_spec().unwrap();
        assert_eq!(spec.kms_key_name, "projects/p/keyRings/r/cryptoKeys/k");
        assert_eq!(GlobalConfig::default().encryption_spec(), None);
    }

    #[test]
    fn test_config_serde_round_trip_skips_credentials() {
        let config = GlobalConfig {
            project: Some("p".to_string()),
            credentials: Some(Credentials::ApiKey("secret".to_string())),
            ..GlobalConfig::default()
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));

        let parsed: GlobalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.project.as_deref(), Some("p"));
        assert!(parsed.credentials.is_none());
        assert_eq!(parsed.worker_threads, DEFAULT_WORKER_THREADS);
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let debug = format!("{:?}", Credentials::ApiKey("secret-key".to_string()));
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("***"));
    }

    #[test]
    #[allow(unsafe_code)] // Test-only: setting env vars for isolated test
    fn test_from_env_reads_altus_variables() {
        unsafe {
            std::env::set_var("ALTUS_PROJECT", "env-prj");
            std::env::set_var("ALTUS_LOCATION", "env-loc");
            std::env::set_var("ALTUS_WORKER_THREADS", "9");
            std::env::set_var("ALTUS_API_KEY", "env-key");
        }

        let config = GlobalConfig::from_env();
        assert_eq!(config.project.as_deref(), Some("env-prj"));
        assert_eq!(config.location.as_deref(), Some("env-loc"));
        assert_eq!(config.worker_threads, 9);
        assert_eq!(config.credentials, Some(Credentials::ApiKey("env-key".to_string())));

        unsafe {
            std::env::remove_var("ALTUS_PROJECT");
            std::env::remove_var("ALTUS_LOCATION");
            std::env::remove_var("ALTUS_WORKER_THREADS");
            std::env::remove_var("ALTUS_API_KEY");
        }
    }
}
