//! Canonical resource naming.
//!
//! Every platform resource is addressed as
//! `projects/{project}/locations/{location}/{collection}/{id}`. Parsing is
//! strict: exactly six segments, known collection, no empty pieces. Anything
//! else is a [`AltusError::BadName`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AltusError, Result};

/// The closed set of resource collections the SDK can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Datasets,
    Models,
    TrainingPipelines,
    Tensorboards,
    TensorboardExperiments,
    TensorboardRuns,
    TensorboardTimeSeries,
}

impl Collection {
    /// The path segment used in canonical names.
    #[must_use]
    pub fn as_segment(self) -> &'static str {
        match self {
            Self::Datasets => "datasets",
            Self::Models => "models",
            Self::TrainingPipelines => "trainingPipelines",
            Self::Tensorboards => "tensorboards",
            Self::TensorboardExperiments => "tensorboardExperiments",
            Self::TensorboardRuns => "tensorboardRuns",
            Self::TensorboardTimeSeries => "tensorboardTimeSeries",
        }
    }

    /// Inverse of [`Collection::as_segment`].
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "datasets" => Some(Self::Datasets),
            "models" => Some(Self::Models),
            "trainingPipelines" => Some(Self::TrainingPipelines),
            "tensorboards" => Some(Self::Tensorboards),
            "tensorboardExperiments" => Some(Self::TensorboardExperiments),
            "tensorboardRuns" => Some(Self::TensorboardRuns),
            "tensorboardTimeSeries" => Some(Self::TensorboardTimeSeries),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_segment())
    }
}

/// A parsed canonical resource name.
///
/// Construction always validates, so a held `ResourceName` is well-formed by
/// definition and formats back to the exact string it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName {
    project: String,
    location: String,
    collection: Collection,
    id: String,
}

fn check_segment(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(AltusError::BadName(format!("{kind} must not be empty")));
    }
    if value.contains('/') {
        return Err(AltusError::BadName(format!("{kind} must not contain '/': {value:?}")));
    }
    Ok(())
}

impl ResourceName {
    /// Builds a name from its parts, validating each segment.
    ///
    /// # Errors
    /// Returns [`AltusError::BadName`] when a part is empty or contains `/`.
    pub fn new(
        project: impl Into<String>,
        location: impl Into<String>,
        collection: Collection,
        id: impl Into<String>,
    ) -> Result<Self> {
        let project = project.into();
        let location = location.into();
        let id = id.into();
        check_segment("project", &project)?;
        check_segment("location", &location)?;
        check_segment("resource id", &id)?;
        Ok(Self { project, location, collection, id })
    }

    /// Parses a canonical name.
    ///
    /// # Errors
    /// Returns [`AltusError::BadName`] unless the input has exactly the shape
    /// `projects/{project}/locations/{location}/{collection}/{id}` with a
    /// known collection segment.
    pub fn parse(name: &str) -> Result<Self> {
        let segments: Vec<&str> = name.split('/').collect();
        if segments.len() != 6 {
            return Err(AltusError::BadName(format!(
                "expected projects/{{project}}/locations/{{location}}/{{collection}}/{{id}}, got {name:?}"
            )));
        }
        if segments[0] != "projects" || segments[2] != "locations" {
            return Err(AltusError::BadName(format!(
                "expected literal segments 'projects' and 'locations' in {name:?}"
            )));
        }
        let collection = Collection::from_segment(segments[4]).ok_or_else(|| {
            AltusError::BadName(format!("unknown collection segment {:?} in {name:?}", segments[4]))
        })?;
        Self::new(segments[1], segments[3], collection, segments[5])
    }

    /// Parses a canonical name and checks it addresses `collection`.
    ///
    /// # Errors
    /// Returns [`AltusError::BadName`] on malformed input or when the name
    /// belongs to a different collection.
    pub fn parse_in(collection: Collection, name: &str) -> Result<Self> {
        let parsed = Self::parse(name)?;
        if parsed.collection != collection {
            return Err(AltusError::BadName(format!(
                "{name:?} is a {} name, expected {}",
                parsed.collection, collection
            )));
        }
        Ok(parsed)
    }

    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn collection(&self) -> Collection {
        self.collection
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The `projects/{project}/locations/{location}` prefix of this name.
    #[must_use]
    pub fn parent(&self) -> String {
        parent_path(&self.project, &self.location)
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/locations/{}/{}/{}",
            self.project,
            self.location,
            self.collection.as_segment(),
            self.id
        )
    }
}

/// Formats the common parent path of location-scoped resources.
#[must_use]
pub fn parent_path(project: &str, location: &str) -> String {
    format!("projects/{project}/locations/{location}")
}
