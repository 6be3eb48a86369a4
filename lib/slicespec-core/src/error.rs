/// Errors that can occur when loading or slicing a [`Document`](crate::Document).
///
/// Only malformed input is fatal. An empty selection is a valid result and
/// dangling references are reported as diagnostics in the
/// [`SliceReport`](crate::SliceReport).
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum SliceError {
    /// The input is not a usable OpenAPI document.
    ///
    /// Occurs when the text cannot be parsed into the document model, or when
    /// the document does not declare an `openapi` version.
    #[display("Invalid document at '{path}': {reason}")]
    #[from(skip)]
    InvalidDocument {
        /// Location of the failure inside the document, `.` for the root.
        path: String,
        /// What is wrong with the document.
        reason: String,
    },

    /// JSON serialization error.
    ///
    /// Occurs when converting the document back to JSON or to a `utoipa` specification.
    JsonError(serde_json::Error),
}

impl SliceError {
    pub(crate) fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<SliceError>();
        assert_sync::<SliceError>();
    }

    #[test]
    fn should_display_invalid_document() {
        let error = SliceError::invalid(".", "missing `openapi` version");

        insta::assert_snapshot!(error, @"Invalid document at '.': missing `openapi` version");
    }
}
