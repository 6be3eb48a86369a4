use std::fmt;

use indexmap::IndexMap;
use indexmap::map::Entry;
use jsonptr::PointerBuf;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::{ComponentKind, Document};

/// A document taking part in a merge, with a name identifying where it comes from.
#[derive(Debug, Clone, Copy)]
pub struct SourceDocument<'a> {
    /// Where the document comes from, usually a file name.
    pub origin: &'a str,
    /// The document.
    pub document: &'a Document,
}

impl<'a> SourceDocument<'a> {
    /// Creates a new source document.
    pub fn new(origin: &'a str, document: &'a Document) -> Self {
        Self { origin, document }
    }
}

/// The part of a document a conflict was found in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConflictSection {
    /// A pruneable component section.
    Component(ComponentKind),
    /// Another `components` section, like `securitySchemes`.
    ComponentEntry {
        /// The section key.
        section: String,
    },
    /// The top-level tag descriptions.
    Tag,
    /// A path-level key, like shared `parameters`, of a path found in several documents.
    PathItem,
    /// An operation bound to the same path and method.
    Operation,
    /// A top-level webhook.
    Webhook,
}

impl fmt::Display for ConflictSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(kind) => write!(f, "{kind}"),
            Self::ComponentEntry { section } => write!(f, "`{section}` entry"),
            Self::Tag => f.write_str("tag"),
            Self::PathItem => f.write_str("path-level key"),
            Self::Operation => f.write_str("operation"),
            Self::Webhook => f.write_str("webhook"),
        }
    }
}

/// A name defined differently in two documents.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{section} `{name}` is defined differently in `{first_origin}` and `{second_origin}`: {mismatch}")]
pub struct ConflictRecord {
    /// Where the name is defined.
    pub section: ConflictSection,
    /// The conflicting name.
    ///
    /// This is the entry name for components, tags and webhooks, `METHOD /path` for
    /// operations and `/path key` for path-level keys.
    pub name: String,
    /// Origin of the first definition.
    pub first_origin: String,
    /// Origin of the definition that differs from the first one.
    pub second_origin: String,
    /// Where the two definitions start to differ.
    pub mismatch: String,
}

/// Finds every name defined differently across `sources`.
///
/// Every entry of every `components` section, the tag descriptions, the path-level keys,
/// the operations and the webhooks are checked. A name defined in several documents is
/// compared with its first definition using structural equality. Every mismatch yields
/// one record: detection never stops early.
///
/// Records are ordered by section, then by first appearance of the name, then by source.
pub fn detect_conflicts(sources: &[SourceDocument<'_>]) -> Vec<ConflictRecord> {
    let mut conflicts = Vec::new();

    for kind in ComponentKind::ALL {
        let mut detector = Detector::new(ConflictSection::Component(kind));
        for source in sources {
            if let Some(components) = &source.document.components {
                for (name, definition) in components.section(kind) {
                    detector.check(source.origin, name.clone(), definition.clone());
                }
            }
        }
        conflicts.extend(detector.conflicts);
    }

    let mut detectors: IndexMap<&str, Detector<'_>> = IndexMap::new();
    for source in sources {
        let Some(components) = &source.document.components else {
            continue;
        };
        for (section, entries) in &components.extra {
            let detector = detectors.entry(section.as_str()).or_insert_with(|| {
                Detector::new(ConflictSection::ComponentEntry {
                    section: section.clone(),
                })
            });
            for (name, definition) in entries.as_object().into_iter().flatten() {
                detector.check(source.origin, name.clone(), definition.clone());
            }
        }
    }
    conflicts.extend(detectors.into_values().flat_map(|detector| detector.conflicts));

    let mut detector = Detector::new(ConflictSection::Tag);
    for source in sources {
        for tag in &source.document.tags {
            detector.check(source.origin, tag.name.clone(), to_value(tag));
        }
    }
    conflicts.extend(detector.conflicts);

    let mut detector = Detector::new(ConflictSection::PathItem);
    for source in sources {
        for (path, item) in &source.document.paths {
            for (key, value) in &item.extra {
                detector.check(source.origin, format!("{path} {key}"), value.clone());
            }
        }
    }
    conflicts.extend(detector.conflicts);

    let mut detector = Detector::new(ConflictSection::Operation);
    for source in sources {
        for (path, method, operation) in source.document.operations() {
            detector.check(source.origin, format!("{method} {path}"), to_value(operation));
        }
    }
    conflicts.extend(detector.conflicts);

    let mut detector = Detector::new(ConflictSection::Webhook);
    for source in sources {
        let webhooks = source.document.extra.get("webhooks").and_then(Value::as_object);
        for (name, item) in webhooks.into_iter().flatten() {
            detector.check(source.origin, name.clone(), item.clone());
        }
    }
    conflicts.extend(detector.conflicts);

    debug!(
        documents = sources.len(),
        conflicts = conflicts.len(),
        "conflict detection done"
    );
    conflicts
}

fn to_value(item: &impl Serialize) -> Value {
    // Tags and operations only hold strings and JSON maps
    serde_json::to_value(item).expect("tags and operations serialize to JSON")
}

struct Detector<'a> {
    section: ConflictSection,
    first: IndexMap<String, (&'a str, Value)>,
    conflicts: Vec<ConflictRecord>,
}

impl<'a> Detector<'a> {
    fn new(section: ConflictSection) -> Self {
        Self {
            section,
            first: IndexMap::new(),
            conflicts: Vec::new(),
        }
    }

    fn check(&mut self, origin: &'a str, name: String, definition: Value) {
        match self.first.entry(name) {
            Entry::Vacant(entry) => {
                entry.insert((origin, definition));
            }
            Entry::Occupied(entry) => {
                let (first_origin, first_definition) = entry.get();
                if *first_definition == definition {
                    return;
                }
                let mismatch = describe_difference(first_definition, &definition);
                debug!(section = %self.section, name = %entry.key(), %first_origin, %origin, %mismatch, "conflict found");
                self.conflicts.push(ConflictRecord {
                    section: self.section.clone(),
                    name: entry.key().clone(),
                    first_origin: first_origin.to_string(),
                    second_origin: origin.to_string(),
                    mismatch,
                });
            }
        }
    }
}

/// Describes the first location where two JSON values differ.
pub(crate) fn describe_difference(first: &Value, second: &Value) -> String {
    let mut location = PointerBuf::new();
    describe_at(first, second, &mut location)
}

fn describe_at(first: &Value, second: &Value, location: &mut PointerBuf) -> String {
    match (first, second) {
        (Value::Object(first_map), Value::Object(second_map)) => {
            for (key, first_entry) in first_map {
                let Some(second_entry) = second_map.get(key) else {
                    location.push_back(key.as_str());
                    return format!("`#{location}` is missing from the second definition");
                };
                if first_entry != second_entry {
                    location.push_back(key.as_str());
                    return describe_at(first_entry, second_entry, location);
                }
            }
            match second_map.keys().find(|key| !first_map.contains_key(*key)) {
                Some(key) => {
                    location.push_back(key.as_str());
                    format!("`#{location}` is missing from the first definition")
                }
                // Map equality ignores key order
                None => format!("`#{location}` differs"),
            }
        }
        (Value::Array(first_items), Value::Array(second_items))
            if first_items.len() == second_items.len() =>
        {
            let difference = first_items
                .iter()
                .zip(second_items)
                .enumerate()
                .find(|(_, (first_item, second_item))| first_item != second_item);
            match difference {
                Some((index, (first_item, second_item))) => {
                    location.push_back(index);
                    describe_at(first_item, second_item, location)
                }
                None => format!("`#{location}` differs"),
            }
        }
        _ => format!("`#{location}` differs ({first} vs {second})"),
    }
}
