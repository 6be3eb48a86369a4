//! Slicing of `utoipa` specifications.

use utoipa::openapi::OpenApi;

use super::{Criteria, SliceReport, slice};
use crate::{Document, SliceError};

/// A sliced `utoipa` specification with the report of what was removed.
#[derive(Debug, Clone)]
pub struct Sliced {
    /// The sliced specification.
    pub spec: OpenApi,
    /// What slicing removed.
    pub report: SliceReport,
}

/// Extension trait for slicing `utoipa` specifications directly.
///
/// The specification is converted to a [`Document`], sliced, and converted back.
pub trait OpenApiSliceExt {
    /// Returns a sliced copy of this specification, keeping the operations matching `criteria`.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError`] if the specification cannot be converted or sliced.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use slicespec_core::{Criteria, OpenApiSliceExt};
    ///
    /// let spec: OpenApi = /* ... */;
    /// let sliced = spec.slice_with(&Criteria::new().with_tag("users"))?;
    /// ```
    fn slice_with(&self, criteria: &Criteria) -> Result<Sliced, SliceError>;
}

impl OpenApiSliceExt for OpenApi {
    fn slice_with(&self, criteria: &Criteria) -> Result<Sliced, SliceError> {
        let mut document = Document::try_from(self)?;
        let report = slice(&mut document, criteria)?;
        let spec = document.to_openapi()?;
        Ok(Sliced { spec, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::path::{OperationBuilder, PathItemBuilder};
    use utoipa::openapi::{
        Components, ContentBuilder, HttpMethod, ObjectBuilder, OpenApiBuilder, Paths, Ref, RefOr,
        ResponseBuilder, Type,
    };

    fn returning(operation_id: &str, tag: &str, schema_name: &str) -> utoipa::openapi::path::Operation {
        OperationBuilder::new()
            .operation_id(Some(operation_id))
            .tags(Some(vec![tag.to_string()]))
            .response(
                "200",
                ResponseBuilder::new()
                    .description("ok")
                    .content(
                        "application/json",
                        ContentBuilder::new()
                            .schema(Some(RefOr::Ref(Ref::from_schema_name(schema_name))))
                            .build(),
                    )
                    .build(),
            )
            .build()
    }

    fn create_test_spec() -> OpenApi {
        let mut components = Components::new();
        for name in ["User", "Order"] {
            components.schemas.insert(
                name.to_string(),
                RefOr::T(ObjectBuilder::new().schema_type(Type::Object).into()),
            );
        }

        let mut paths = Paths::new();
        paths.paths.insert(
            "/users".to_string(),
            PathItemBuilder::new()
                .operation(HttpMethod::Get, returning("listUsers", "users", "User"))
                .build(),
        );
        paths.paths.insert(
            "/orders".to_string(),
            PathItemBuilder::new()
                .operation(HttpMethod::Get, returning("listOrders", "orders", "Order"))
                .build(),
        );

        OpenApiBuilder::new()
            .paths(paths)
            .components(Some(components))
            .build()
    }

    #[test]
    fn should_slice_utoipa_spec() {
        let spec = create_test_spec();

        let sliced = spec
            .slice_with(&Criteria::new().with_operation_id("listOrders"))
            .expect("should slice");

        assert_eq!(sliced.report.remaining_operations, 1);
        assert_eq!(
            sliced.spec.paths.paths.keys().collect::<Vec<_>>(),
            vec!["/orders"]
        );
        let components = sliced.spec.components.expect("should keep components");
        assert_eq!(components.schemas.keys().collect::<Vec<_>>(), vec!["Order"]);
    }

    #[test]
    fn should_leave_original_spec_untouched() {
        let spec = create_test_spec();

        let _ = spec.slice_with(&Criteria::new()).expect("should slice");

        assert_eq!(spec.paths.paths.len(), 2);
    }
}
