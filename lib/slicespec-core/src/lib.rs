//! # Slicespec Core
//!
//! Slice OpenAPI specifications down to a selection of operations, and keep the result
//! internally consistent.
//!
//! This crate provides:
//! - **[`slice`]** - keep the operations matching a [`Criteria`], drop empty paths,
//!   then prune every component and tag that is no longer referenced
//! - **[`merge`](merge::merge)** - combine several documents, reporting every naming conflict
//! - **[`DocumentStore`](store::DocumentStore)** - named documents that can be sliced atomically
//!
//! ## Quick Start
//!
//! ```rust
//! use slicespec_core::{Criteria, Document, slice};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut document = Document::from_json(
//!     r##"{
//!       "openapi": "3.1.0",
//!       "info": { "title": "Demo", "version": "1.0.0" },
//!       "paths": {
//!         "/users/{id}": {
//!           "get": {
//!             "operationId": "getUser",
//!             "tags": ["users"],
//!             "responses": {
//!               "200": {
//!                 "description": "ok",
//!                 "content": { "application/json": { "schema": { "$ref": "#/components/schemas/User" } } }
//!               }
//!             }
//!           }
//!         },
//!         "/orders": {
//!           "get": { "operationId": "listOrders", "tags": ["orders"], "responses": {} }
//!         }
//!       },
//!       "components": {
//!         "schemas": {
//!           "User": { "type": "object" },
//!           "Order": { "type": "object" }
//!         }
//!       }
//!     }"##,
//! )?;
//!
//! let criteria = Criteria::new().with_path("/users/{user_id}");
//! let report = slice(&mut document, &criteria)?;
//!
//! assert_eq!(report.remaining_operations, 1);
//! assert!(document.paths.contains_key("/users/{id}"));
//! assert!(!document.paths.contains_key("/orders"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Selection rules
//!
//! A [`Criteria`] holds three lists: operation ids, tags and path patterns.
//! An operation is kept when it satisfies *any* non-empty list. Path patterns are
//! compared after [`normalize_path`], so `/users/{id}` matches `/users/{user_id}`.
//! A criteria with every list empty selects nothing, and slicing with it empties the
//! document's paths.
//!
//! ## Pruning rules
//!
//! After selection, a reference graph is built from the retained parts of the document
//! (`$ref` expressions pointing into `#/components/...`). Component entries that cannot be
//! reached from the surviving operations are removed, and so are top-level tags that no
//! surviving operation lists. References to missing components never abort slicing: they
//! are reported in [`SliceReport::dangling`].

mod error;
pub use self::error::SliceError;

pub mod model;
pub use self::model::{
    ComponentKind, ComponentRef, Components, Document, HttpMethod, Operation, PathItem, Tag,
};

pub mod slice;
pub use self::slice::{
    Criteria, OpenApiSliceExt, ReferenceGraph, SliceReport, normalize_path, prune,
    select_operations, slice,
};

pub mod merge;

pub mod store;
pub use self::store::{DocumentStore, StoreError};

#[cfg(feature = "yaml")]
mod yaml;
#[cfg(feature = "yaml")]
pub use self::yaml::{ToYaml, YamlError};
