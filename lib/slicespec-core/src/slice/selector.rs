use tracing::debug;

use super::Criteria;
use crate::{Document, HttpMethod};

/// An operation removed by [`select_operations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedOperation {
    /// The path the operation was bound to.
    pub path: String,
    /// The method slot that was cleared.
    pub method: HttpMethod,
    /// The identifier of the removed operation, if it had one.
    pub operation_id: Option<String>,
}

/// What [`select_operations`] removed from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Number of operations still present.
    pub kept_operations: usize,
    /// Operations that did not match, in document order.
    pub removed_operations: Vec<RemovedOperation>,
    /// Paths removed because no operation was left on them, in document order.
    pub removed_paths: Vec<String>,
}

/// Removes every operation not matching `criteria`, then every path left without operation.
///
/// The path keys are snapshotted before the walk so the live map can be mutated safely;
/// removed paths keep the relative order of the remaining ones.
/// A document without paths is left untouched.
pub fn select_operations(document: &mut Document, criteria: &Criteria) -> Selection {
    let mut selection = Selection::default();
    if document.paths.is_empty() {
        return selection;
    }
    if criteria.is_empty() {
        debug!("empty criteria, no operation will be kept");
    }

    let paths: Vec<String> = document.paths.keys().cloned().collect();
    for path in paths {
        let Some(item) = document.paths.get_mut(&path) else {
            continue;
        };

        for method in HttpMethod::ALL {
            let Some(operation) = item.operation(method) else {
                continue;
            };
            if criteria.matches(&path, Some(operation)) {
                selection.kept_operations += 1;
                continue;
            }

            if let Some(removed) = item.remove_operation(method) {
                debug!(%path, %method, operation_id = ?removed.operation_id, "operation removed");
                selection.removed_operations.push(RemovedOperation {
                    path: path.clone(),
                    method,
                    operation_id: removed.operation_id,
                });
            }
        }

        if !item.has_operations() {
            debug!(%path, "path removed");
            document.paths.shift_remove(&path);
            selection.removed_paths.push(path);
        }
    }

    selection
}
