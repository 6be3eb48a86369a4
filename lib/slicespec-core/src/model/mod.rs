//! In-memory model of an OpenAPI document.
//!
//! The model only types what slicing needs to reason about: paths, operations,
//! tags and the component sections that can be the target of a `$ref`.
//! Everything else (`info`, `servers`, `security`, extensions, schema bodies...) is kept
//! verbatim as JSON values, so a parsed document serializes back with the same shape.

mod document;
pub use self::document::{Components, Document, HttpMethod, Operation, PathItem, Paths, Tag};

mod reference;
pub use self::reference::{ComponentKind, ComponentRef, visit_references};

mod openapi;
