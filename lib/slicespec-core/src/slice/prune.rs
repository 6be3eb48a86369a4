use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use super::ReferenceGraph;
use crate::{ComponentKind, ComponentRef, Components, Document, HttpMethod};

/// The component entries reachable from the roots of a [`ReferenceGraph`].
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_more::Deref)]
pub struct ReachabilitySet(BTreeSet<ComponentRef>);

impl ReachabilitySet {
    /// Marks every entry reachable from the graph roots.
    ///
    /// Each entry is visited once, so reference cycles terminate.
    pub fn mark(graph: &ReferenceGraph) -> Self {
        let mut reachable = BTreeSet::new();
        let mut stack: Vec<&ComponentRef> = graph.roots().iter().collect();

        while let Some(node) = stack.pop() {
            if !reachable.insert(node.clone()) {
                continue;
            }
            stack.extend(
                graph
                    .references(node)
                    .filter(|target| !reachable.contains(*target)),
            );
        }

        Self(reachable)
    }

    /// Returns `true` if the `name` entry of the `kind` section is reachable.
    pub fn contains_entry(&self, kind: ComponentKind, name: &str) -> bool {
        self.0.contains(&ComponentRef::new(kind, name))
    }
}

/// What [`prune`] removed from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pruned {
    /// Unreachable component entries, sorted.
    pub removed_components: Vec<ComponentRef>,
    /// Tag descriptions no remaining operation lists, sorted.
    pub removed_tags: Vec<String>,
}

impl Pruned {
    /// Returns `true` if nothing was removed.
    pub fn is_empty(&self) -> bool {
        self.removed_components.is_empty() && self.removed_tags.is_empty()
    }
}

/// Removes every component entry and tag description the remaining operations do not use.
///
/// Component entries are kept iff they belong to the [`ReachabilitySet`] of `graph`.
/// A top-level tag description is kept iff at least one remaining operation lists it,
/// webhook operations included. A `components` object left without any entry is removed.
pub fn prune(document: &mut Document, graph: &ReferenceGraph) -> Pruned {
    let reachable = ReachabilitySet::mark(graph);
    let mut pruned = Pruned::default();

    if let Some(components) = document.components.as_mut() {
        for kind in ComponentKind::ALL {
            components.section_mut(kind).retain(|name, _| {
                let keep = reachable.contains_entry(kind, name);
                if !keep {
                    debug!(%kind, %name, "component removed");
                    pruned
                        .removed_components
                        .push(ComponentRef::new(kind, name.clone()));
                }
                keep
            });
        }
    }
    if document
        .components
        .as_ref()
        .is_some_and(Components::is_empty)
    {
        document.components = None;
    }

    let used_tags: BTreeSet<String> = document
        .operations()
        .flat_map(|(_, _, operation)| operation.tags.iter().map(String::as_str))
        .chain(webhook_tags(document))
        .map(str::to_string)
        .collect();
    document.tags.retain(|tag| {
        let keep = used_tags.contains(&tag.name);
        if !keep {
            debug!(tag = %tag.name, "tag removed");
            pruned.removed_tags.push(tag.name.clone());
        }
        keep
    });

    pruned.removed_components.sort();
    pruned.removed_tags.sort();
    pruned
}

/// Tags listed by the operations of the top-level `webhooks`, which slicing never removes.
fn webhook_tags(document: &Document) -> impl Iterator<Item = &str> {
    document
        .extra
        .get("webhooks")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|webhooks| webhooks.values().filter_map(Value::as_object))
        .flat_map(|item| {
            HttpMethod::ALL
                .into_iter()
                .filter_map(move |method| item.get(method.as_str()))
        })
        .filter_map(|operation| operation.get("tags").and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_str)
}
