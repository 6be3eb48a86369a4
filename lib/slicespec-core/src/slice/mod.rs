//! Selective slicing of OpenAPI documents.
//!
//! Slicing runs three steps over a [`Document`]:
//!
//! 1. [`select_operations`] keeps the operations matching a [`Criteria`] and removes
//!    the paths left without any operation
//! 2. [`ReferenceGraph::build`] collects the component references of what remains
//! 3. [`prune`] removes the component entries and tag descriptions nothing uses anymore
//!
//! [`slice`] chains the steps and reports what changed in a [`SliceReport`].
//! The steps are public so a caller can inspect intermediate results, for instance
//! to list the dangling references of a document without removing anything.

use std::fmt;

use tracing::{info, instrument, warn};

use crate::{Document, SliceError};

mod criteria;
mod ext;
mod graph;
mod prune;
mod selector;

pub use self::criteria::{Criteria, normalize_path};
pub use self::ext::{OpenApiSliceExt, Sliced};
pub use self::graph::{DanglingReference, ReferenceGraph, Referrer};
pub use self::prune::{Pruned, ReachabilitySet, prune};
pub use self::selector::{RemovedOperation, Selection, select_operations};

/// The outcome of [`slice`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceReport {
    /// Operations and paths removed by the selection.
    pub selection: Selection,
    /// Components and tags removed by pruning.
    pub pruned: Pruned,
    /// References to missing components found in the retained document.
    pub dangling: Vec<DanglingReference>,
    /// Number of operations left in the document.
    pub remaining_operations: usize,
}

impl SliceReport {
    /// Returns `true` if no operation is left.
    ///
    /// This is a valid outcome: the document then serializes with empty `paths`.
    pub fn is_empty_result(&self) -> bool {
        self.remaining_operations == 0
    }

    /// Returns `true` if slicing removed anything.
    pub fn has_changes(&self) -> bool {
        !self.selection.removed_operations.is_empty()
            || !self.selection.removed_paths.is_empty()
            || !self.pruned.is_empty()
    }
}

impl fmt::Display for SliceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} operation(s) kept, {} removed ({} path(s)), {} component(s) and {} tag(s) pruned",
            self.remaining_operations,
            self.selection.removed_operations.len(),
            self.selection.removed_paths.len(),
            self.pruned.removed_components.len(),
            self.pruned.removed_tags.len(),
        )?;
        if !self.dangling.is_empty() {
            write!(f, ", {} dangling reference(s)", self.dangling.len())?;
        }
        Ok(())
    }
}

/// Slices a document in place.
///
/// Keeps the operations matching `criteria`, removes the paths left without operation,
/// then prunes every component entry and tag description the remaining operations
/// do not use. Slicing an already sliced document with the same criteria changes nothing.
///
/// A document without paths is left untouched. A criteria matching nothing empties
/// the paths, this is not an error.
///
/// # Errors
///
/// Returns [`SliceError::InvalidDocument`] if the document does not declare an `openapi` version.
///
/// # Example
///
/// ```rust
/// use slicespec_core::{Criteria, Document, HttpMethod, Operation, PathItem, slice};
///
/// let mut document = Document::new("3.1.0")
///     .with_path("/users", PathItem::new().with_operation(HttpMethod::Get, Operation::new().with_tag("users")))
///     .with_path("/orders", PathItem::new().with_operation(HttpMethod::Get, Operation::new().with_tag("orders")));
///
/// let report = slice(&mut document, &Criteria::new().with_tag("users"))?;
///
/// assert_eq!(report.remaining_operations, 1);
/// assert_eq!(report.selection.removed_paths, vec!["/orders"]);
/// # Ok::<(), slicespec_core::SliceError>(())
/// ```
#[instrument(skip_all, fields(%criteria))]
pub fn slice(document: &mut Document, criteria: &Criteria) -> Result<SliceReport, SliceError> {
    if document.openapi_version().is_none() {
        return Err(SliceError::invalid(".", "missing `openapi` version"));
    }
    if document.paths.is_empty() {
        info!("document has no paths, nothing to slice");
        return Ok(SliceReport::default());
    }

    let selection = select_operations(document, criteria);
    let graph = ReferenceGraph::build(document);
    for dangling in graph.dangling() {
        warn!(%dangling, "dangling reference");
    }
    let pruned = prune(document, &graph);

    let report = SliceReport {
        selection,
        pruned,
        dangling: graph.dangling().to_vec(),
        remaining_operations: document.operation_count(),
    };
    info!(%report, "document sliced");
    Ok(report)
}
