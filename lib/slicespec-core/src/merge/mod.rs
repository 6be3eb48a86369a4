//! Combining several OpenAPI documents.
//!
//! Documents built by independent services often share component names.
//! [`detect_conflicts`] lists every name defined differently across documents, and
//! [`merge`] combines documents only when there is no such conflict. Apart from the
//! document metadata (`info`, `servers`...) taken from the first document, this module
//! never picks a winner between two different definitions.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use slicespec_core::ComponentKind;
//! use slicespec_core::Document;
//! use slicespec_core::merge::{SourceDocument, detect_conflicts};
//!
//! let users = Document::new("3.1.0")
//!     .with_component(ComponentKind::Schema, "User", json!({ "type": "object" }));
//! let accounts = Document::new("3.1.0")
//!     .with_component(ComponentKind::Schema, "User", json!({ "type": "string" }));
//!
//! let conflicts = detect_conflicts(&[
//!     SourceDocument::new("users.json", &users),
//!     SourceDocument::new("accounts.json", &accounts),
//! ]);
//!
//! assert_eq!(conflicts.len(), 1);
//! assert_eq!(conflicts[0].name, "User");
//! ```

mod conflict;
mod merger;

pub use self::conflict::{ConflictRecord, ConflictSection, SourceDocument, detect_conflicts};
pub use self::merger::{MergeError, merge};
