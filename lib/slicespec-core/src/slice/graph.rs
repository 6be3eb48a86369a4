use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use serde_json::Value;
use tracing::{debug, trace};

use crate::model::visit_references;
use crate::{ComponentRef, Document, HttpMethod};

/// Where a reference was found.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Referrer {
    /// A top-level key of the document, like `webhooks`.
    Document {
        /// The top-level key.
        key: String,
    },
    /// A path-level key, like shared `parameters`.
    PathItem {
        /// The path template.
        path: String,
    },
    /// An operation.
    Operation {
        /// The path template.
        path: String,
        /// The method the operation is bound to.
        method: HttpMethod,
    },
    /// A `components` section that is never pruned, like `callbacks`.
    ComponentSection {
        /// The section key.
        section: String,
    },
    /// Another component entry.
    Component(ComponentRef),
}

impl fmt::Display for Referrer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document { key } => write!(f, "#/{key}"),
            Self::PathItem { path } => write!(f, "path {path}"),
            Self::Operation { path, method } => write!(f, "operation {method} {path}"),
            Self::ComponentSection { section } => write!(f, "#/components/{section}"),
            Self::Component(reference) => write!(f, "{reference}"),
        }
    }
}

/// A reference to a component entry missing from the document.
///
/// The document was already inconsistent before slicing: this is reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, derive_more::Display)]
#[display("{referrer} references missing {target}")]
pub struct DanglingReference {
    /// The missing entry.
    pub target: ComponentRef,
    /// Where the reference was found.
    pub referrer: Referrer,
}

/// The references between the retained parts of a document and its component entries.
///
/// Nodes are [`ComponentRef`]s and edges are kept in an adjacency map, so traversals
/// only need a visited set to stay safe on cyclic schemas.
///
/// Roots are the entries referenced from everything slicing keeps unconditionally:
/// the remaining operations and path items, the other top-level keys (`webhooks`...)
/// and the component sections that are never pruned. Edges are discovered
/// transitively from the roots while building, so the graph holds every entry
/// reachable from the roots and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceGraph {
    roots: BTreeSet<ComponentRef>,
    edges: BTreeMap<ComponentRef, BTreeSet<ComponentRef>>,
    dangling: Vec<DanglingReference>,
}

impl ReferenceGraph {
    /// Builds the reference graph of a document.
    pub fn build(document: &Document) -> Self {
        let mut builder = GraphBuilder {
            document,
            graph: Self::default(),
            pending: VecDeque::new(),
        };
        builder.collect_roots();
        builder.walk();

        let graph = builder.graph;
        debug!(
            roots = graph.roots.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dangling = graph.dangling.len(),
            "reference graph built"
        );
        graph
    }

    /// Entries referenced directly from the retained parts of the document.
    pub fn roots(&self) -> &BTreeSet<ComponentRef> {
        &self.roots
    }

    /// Every entry of the graph.
    pub fn nodes(&self) -> impl Iterator<Item = &ComponentRef> {
        self.edges.keys()
    }

    /// Entries directly referenced by `node`.
    pub fn references(&self, node: &ComponentRef) -> impl Iterator<Item = &ComponentRef> {
        self.edges.get(node).into_iter().flatten()
    }

    /// Returns `true` if `node` is part of the graph.
    pub fn contains(&self, node: &ComponentRef) -> bool {
        self.edges.contains_key(node)
    }

    /// Number of entries.
    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of references between entries.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// References to missing entries found while building, sorted.
    pub fn dangling(&self) -> &[DanglingReference] {
        &self.dangling
    }
}

struct GraphBuilder<'a> {
    document: &'a Document,
    graph: ReferenceGraph,
    pending: VecDeque<ComponentRef>,
}

impl GraphBuilder<'_> {
    fn collect_roots(&mut self) {
        let document = self.document;

        for (key, value) in &document.extra {
            let referrer = Referrer::Document { key: key.clone() };
            self.scan(value, &referrer);
        }

        for (path, item) in &document.paths {
            if !item.extra.is_empty() {
                let referrer = Referrer::PathItem { path: path.clone() };
                for value in item.extra.values() {
                    self.scan(value, &referrer);
                }
            }
            for (method, operation) in item.operations() {
                let referrer = Referrer::Operation {
                    path: path.clone(),
                    method,
                };
                for value in operation.body.values() {
                    self.scan(value, &referrer);
                }
            }
        }

        if let Some(components) = &document.components {
            for (section, value) in &components.extra {
                let referrer = Referrer::ComponentSection {
                    section: section.clone(),
                };
                self.scan(value, &referrer);
            }
        }
    }

    fn walk(&mut self) {
        let document = self.document;

        while let Some(node) = self.pending.pop_front() {
            // Only existing entries are queued
            let Some(definition) = document.component(&node) else {
                continue;
            };
            let referrer = Referrer::Component(node);
            self.scan(definition, &referrer);
        }

        self.graph.dangling.sort();
        self.graph.dangling.dedup();
    }

    fn scan(&mut self, value: &Value, referrer: &Referrer) {
        let mut locations = Vec::new();
        visit_references(value, &mut |location| locations.push(location));

        for location in locations {
            let Some(target) = ComponentRef::parse(&location) else {
                trace!(%location, %referrer, "reference ignored");
                continue;
            };
            self.link(referrer, target);
        }
    }

    fn link(&mut self, referrer: &Referrer, target: ComponentRef) {
        if self.document.component(&target).is_none() {
            self.graph.dangling.push(DanglingReference {
                target,
                referrer: referrer.clone(),
            });
            return;
        }

        match referrer {
            Referrer::Component(source) => {
                self.graph
                    .edges
                    .entry(source.clone())
                    .or_default()
                    .insert(target.clone());
            }
            _ => {
                self.graph.roots.insert(target.clone());
            }
        }

        if !self.graph.edges.contains_key(&target) {
            self.graph.edges.insert(target.clone(), BTreeSet::new());
            self.pending.push_back(target);
        }
    }
}
