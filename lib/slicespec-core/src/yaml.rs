//! YAML support using serde-saphyr.
//!
//! Only available when the `yaml` feature is enabled.
//!
//! # Example
//!
//! ```rust
//! use slicespec_core::{Criteria, Document, ToYaml, slice};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut document = Document::from_yaml(
//!     r"
//! openapi: 3.1.0
//! info:
//!   title: Demo
//!   version: 1.0.0
//! paths:
//!   /health:
//!     get:
//!       operationId: health
//!   /users:
//!     get:
//!       operationId: listUsers
//! ",
//! )?;
//!
//! slice(&mut document, &Criteria::new().with_operation_id("health"))?;
//!
//! let yaml = document.to_yaml()?;
//! assert!(yaml.contains("/health"));
//! assert!(!yaml.contains("/users"));
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Criteria, Document, SliceError};

/// Error type for YAML serialization operations.
pub type YamlError = serde_saphyr::ser_error::Error;

/// Extension trait for serializing types to YAML.
///
/// Implemented for every type implementing [`Serialize`], such as [`Document`],
/// [`Criteria`] or a `utoipa` specification.
pub trait ToYaml: Serialize + Sized {
    /// Serializes this value to a YAML string.
    ///
    /// # Errors
    ///
    /// Returns a [`YamlError`] if serialization fails.
    fn to_yaml(&self) -> Result<String, YamlError> {
        serde_saphyr::to_string(self)
    }
}

impl<T: Serialize + Sized> ToYaml for T {}

impl Document {
    /// Parses a document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::InvalidDocument`] if the text is not YAML, or does not
    /// have the shape of an OpenAPI document.
    pub fn from_yaml(yaml: &str) -> Result<Self, SliceError> {
        let value = parse_yaml::<Value>(yaml)?;
        Self::from_value(value)
    }
}

impl Criteria {
    /// Parses a criteria from YAML text (`operationIds`, `tags` and `paths` keys).
    ///
    /// JSON being a subset of YAML, this also reads JSON criteria.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::InvalidDocument`] if the text is not a valid criteria.
    pub fn from_yaml(yaml: &str) -> Result<Self, SliceError> {
        parse_yaml(yaml)
    }
}

fn parse_yaml<T: DeserializeOwned>(yaml: &str) -> Result<T, SliceError> {
    serde_saphyr::from_str(yaml).map_err(|error| SliceError::invalid(".", error.to_string()))
}
