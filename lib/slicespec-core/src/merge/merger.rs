use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use super::{ConflictRecord, SourceDocument, detect_conflicts};
use crate::{ComponentKind, Components, Document};

/// Top-level keys merged entry by entry instead of taken from the base document.
const KEYED_TOP_LEVEL_KEYS: [&str; 1] = ["webhooks"];

/// Errors that can occur when merging documents.
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum MergeError {
    /// Nothing to merge.
    #[display("No document to merge")]
    NoDocument,

    /// Some names are defined differently across the documents.
    ///
    /// Every conflict is listed, not only the first one.
    #[display("{} conflict(s) prevent merging", conflicts.len())]
    Conflicts {
        /// The conflicts found by [`detect_conflicts`].
        conflicts: Vec<ConflictRecord>,
    },
}

/// Merges several documents into one.
///
/// The first document is the base: its top-level keys (`openapi`, `info`, `servers`...) win.
/// Paths, operations, path-level keys, webhooks, the entries of every `components`
/// section and tag descriptions of the following documents are added when absent from
/// the result. Identical duplicates collapse into one.
///
/// # Errors
///
/// Returns [`MergeError::NoDocument`] if `sources` is empty, and
/// [`MergeError::Conflicts`] if any name is defined differently in two documents.
#[instrument(skip_all, fields(documents = sources.len()))]
pub fn merge(sources: &[SourceDocument<'_>]) -> Result<Document, MergeError> {
    let Some((base, others)) = sources.split_first() else {
        return Err(MergeError::NoDocument);
    };

    let conflicts = detect_conflicts(sources);
    if !conflicts.is_empty() {
        return Err(MergeError::Conflicts { conflicts });
    }

    let mut merged = base.document.clone();
    for source in others {
        merge_into(&mut merged, source.document);
        debug!(origin = source.origin, "document merged");
    }

    info!(
        paths = merged.paths.len(),
        operations = merged.operation_count(),
        "documents merged"
    );
    Ok(merged)
}

fn merge_into(target: &mut Document, other: &Document) {
    for (key, value) in &other.extra {
        if KEYED_TOP_LEVEL_KEYS.contains(&key.as_str()) {
            merge_section(&mut target.extra, key, value);
        } else {
            target
                .extra
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    for (path, item) in &other.paths {
        let Some(existing) = target.paths.get_mut(path) else {
            target.paths.insert(path.clone(), item.clone());
            continue;
        };
        for (method, operation) in item.operations() {
            if existing.operation(method).is_none() {
                existing.set_operation(method, operation.clone());
            }
        }
        for (key, value) in &item.extra {
            existing
                .extra
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    if let Some(components) = &other.components {
        let merged = target.components.get_or_insert_with(Components::default);
        for kind in ComponentKind::ALL {
            let section = merged.section_mut(kind);
            for (name, definition) in components.section(kind) {
                section
                    .entry(name.clone())
                    .or_insert_with(|| definition.clone());
            }
        }
        for (key, value) in &components.extra {
            merge_section(&mut merged.extra, key, value);
        }
    }

    for tag in &other.tags {
        if target.tag(&tag.name).is_none() {
            target.tags.push(tag.clone());
        }
    }
}

/// Adds the section `key` to `target`, or its missing entries when `target` already has it.
fn merge_section(target: &mut Map<String, Value>, key: &str, section: &Value) {
    let Some(existing) = target.get_mut(key) else {
        target.insert(key.to_string(), section.clone());
        return;
    };
    if let (Value::Object(existing), Value::Object(entries)) = (existing, section) {
        for (name, entry) in entries {
            existing
                .entry(name.clone())
                .or_insert_with(|| entry.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentRef, HttpMethod, Operation, PathItem, Tag};
    use serde_json::json;

    fn get(operation_id: &str) -> PathItem {
        PathItem::new().with_operation(HttpMethod::Get, Operation::new().with_operation_id(operation_id))
    }

    #[test]
    fn should_merge_disjoint_documents() {
        let users = Document::new("3.1.0")
            .with_path("/users", get("listUsers"))
            .with_component(ComponentKind::Schema, "User", json!({ "type": "object" }))
            .with_tag(Tag::new("users"));
        let orders = Document::new("3.0.3")
            .with_path("/orders", get("listOrders"))
            .with_path(
                "/users",
                PathItem::new().with_operation(HttpMethod::Post, Operation::new().with_operation_id("createUser")),
            )
            .with_component(ComponentKind::Schema, "Order", json!({ "type": "object" }))
            .with_component(ComponentKind::Schema, "User", json!({ "type": "object" }))
            .with_tag(Tag::new("orders"))
            .with_tag(Tag::new("users"));

        let merged = merge(&[
            SourceDocument::new("users.json", &users),
            SourceDocument::new("orders.json", &orders),
        ])
        .expect("should merge");

        assert_eq!(merged.openapi_version(), Some("3.1.0"));
        assert_eq!(merged.paths.keys().collect::<Vec<_>>(), vec!["/users", "/orders"]);
        assert_eq!(merged.operation_count(), 3);
        assert!(
            merged
                .component(&ComponentRef::new(ComponentKind::Schema, "Order"))
                .is_some()
        );
        let tags: Vec<_> = merged.tags.iter().map(|tag| tag.name.as_str()).collect();
        assert_eq!(tags, vec!["users", "orders"]);
    }

    #[test]
    fn should_refuse_conflicting_documents() {
        let first = Document::new("3.1.0")
            .with_component(ComponentKind::Schema, "User", json!({ "type": "object" }))
            .with_component(ComponentKind::Response, "NotFound", json!({ "description": "a" }));
        let second = Document::new("3.1.0")
            .with_component(ComponentKind::Schema, "User", json!({ "type": "string" }))
            .with_component(ComponentKind::Response, "NotFound", json!({ "description": "b" }));

        let error = merge(&[
            SourceDocument::new("first", &first),
            SourceDocument::new("second", &second),
        ])
        .expect_err("should fail");

        insta::assert_snapshot!(error, @"2 conflict(s) prevent merging");
        let MergeError::Conflicts { conflicts } = error else {
            panic!("expected conflicts");
        };
        assert_eq!(conflicts.len(), 2);
    }

    #[test]
    fn should_refuse_empty_input() {
        let error = merge(&[]).expect_err("should fail");

        assert!(matches!(error, MergeError::NoDocument));
    }

    #[test]
    fn should_return_single_document_unchanged() {
        let document = Document::new("3.1.0").with_path("/users", get("listUsers"));

        let merged = merge(&[SourceDocument::new("only", &document)]).expect("should merge");

        assert_eq!(merged, document);
    }

    fn secured(scheme: &str) -> Document {
        let mut requirement = Map::new();
        requirement.insert(scheme.to_string(), json!([]));
        let mut document = Document::new("3.1.0").with_path(
            format!("/{scheme}"),
            PathItem::new().with_operation(
                HttpMethod::Get,
                Operation::new()
                    .with_operation_id(format!("get_{scheme}"))
                    .with_entry("security", Value::Array(vec![Value::Object(requirement)])),
            ),
        );
        let mut schemes = Map::new();
        schemes.insert(
            scheme.to_string(),
            json!({ "type": "apiKey", "in": "header", "name": format!("X-{scheme}") }),
        );
        let components = document.components.get_or_insert_with(Components::default);
        components
            .extra
            .insert("securitySchemes".to_string(), Value::Object(schemes));
        document
    }

    #[test]
    fn should_merge_disjoint_security_schemes() {
        let first = secured("a");
        let second = secured("b");

        let merged = merge(&[
            SourceDocument::new("a.json", &first),
            SourceDocument::new("b.json", &second),
        ])
        .expect("should merge");

        let schemes = merged
            .components
            .as_ref()
            .and_then(|components| components.extra.get("securitySchemes"))
            .and_then(Value::as_object)
            .expect("should keep security schemes");
        assert_eq!(schemes.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn should_refuse_conflicting_security_schemes() {
        let first = secured("a");
        let mut second = secured("a");
        if let Some(components) = second.components.as_mut() {
            components.extra.insert(
                "securitySchemes".to_string(),
                json!({ "a": { "type": "http", "scheme": "basic" } }),
            );
        }

        let error = merge(&[
            SourceDocument::new("a.json", &first),
            SourceDocument::new("b.json", &second),
        ])
        .expect_err("should fail");

        let MergeError::Conflicts { conflicts } = error else {
            panic!("expected conflicts");
        };
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].name, "a");
    }

    #[test]
    fn should_merge_webhooks_by_name() {
        let mut first = Document::new("3.1.0");
        first.extra.insert(
            "webhooks".to_string(),
            json!({ "newPet": { "post": { "operationId": "petCreated" } } }),
        );
        let mut second = Document::new("3.1.0");
        second.extra.insert(
            "webhooks".to_string(),
            json!({ "newOrder": { "post": { "operationId": "orderCreated" } } }),
        );

        let merged = merge(&[
            SourceDocument::new("pets", &first),
            SourceDocument::new("orders", &second),
        ])
        .expect("should merge");

        let webhooks = merged
            .extra
            .get("webhooks")
            .and_then(Value::as_object)
            .expect("should keep webhooks");
        assert_eq!(webhooks.keys().collect::<Vec<_>>(), vec!["newPet", "newOrder"]);
    }
}
