//! Conversions between [`Document`] and `utoipa` specifications.

use utoipa::openapi::OpenApi;

use super::Document;
use crate::SliceError;

impl TryFrom<&OpenApi> for Document {
    type Error = SliceError;

    fn try_from(spec: &OpenApi) -> Result<Self, Self::Error> {
        let value = serde_json::to_value(spec)?;
        Self::from_value(value)
    }
}

impl TryFrom<OpenApi> for Document {
    type Error = SliceError;

    fn try_from(spec: OpenApi) -> Result<Self, Self::Error> {
        Self::try_from(&spec)
    }
}

impl Document {
    /// Converts the document into a `utoipa` specification.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::JsonError`] if the document holds values `utoipa` cannot represent.
    pub fn to_openapi(&self) -> Result<OpenApi, SliceError> {
        let value = serde_json::to_value(self)?;
        let spec = serde_json::from_value(value)?;
        Ok(spec)
    }
}
