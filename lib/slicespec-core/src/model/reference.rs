use std::borrow::Cow;
use std::fmt;

use jsonptr::Pointer;
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

/// The component sections a `$ref` can point into, and that pruning may shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// `#/components/schemas`
    Schema,
    /// `#/components/responses`
    Response,
    /// `#/components/parameters`
    Parameter,
    /// `#/components/requestBodies`
    RequestBody,
    /// `#/components/headers`
    Header,
    /// `#/components/examples`
    Example,
}

impl ComponentKind {
    /// Every pruneable section.
    pub const ALL: [Self; 6] = [
        Self::Schema,
        Self::Response,
        Self::Parameter,
        Self::RequestBody,
        Self::Header,
        Self::Example,
    ];

    /// The key of the section inside `components`.
    pub fn section(self) -> &'static str {
        match self {
            Self::Schema => "schemas",
            Self::Response => "responses",
            Self::Parameter => "parameters",
            Self::RequestBody => "requestBodies",
            Self::Header => "headers",
            Self::Example => "examples",
        }
    }

    /// Resolves a section key back to its kind.
    pub fn from_section(section: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.section() == section)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Schema => "schema",
            Self::Response => "response",
            Self::Parameter => "parameter",
            Self::RequestBody => "request body",
            Self::Header => "header",
            Self::Example => "example",
        };
        f.write_str(label)
    }
}

/// Identifies one entry of a component section.
///
/// This is the node identifier of the reference graph: references are looked up by
/// name, never held as pointers, so a reference to a missing entry is a data problem
/// and not a memory one.
///
/// # Example
///
/// ```rust
/// use slicespec_core::{ComponentKind, ComponentRef};
///
/// let reference = ComponentRef::parse("#/components/schemas/User").expect("local reference");
/// assert_eq!(reference, ComponentRef::new(ComponentKind::Schema, "User"));
/// assert_eq!(reference.to_string(), "#/components/schemas/User");
///
/// // References into other files are not followed
/// assert_eq!(ComponentRef::parse("common.yaml#/components/schemas/Error"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentRef {
    /// The section of the entry.
    pub kind: ComponentKind,
    /// The entry name inside its section.
    pub name: String,
}

impl ComponentRef {
    /// Creates a reference to `name` in the `kind` section.
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Parses a `$ref` location into the component entry it designates.
    ///
    /// The fragment is percent-decoded, then read as a JSON pointer (`~0`, `~1` escapes).
    /// A pointer reaching inside an entry, like `#/components/schemas/User/properties/id`,
    /// designates the entry itself (`User`).
    ///
    /// Returns `None` for references to other documents and for local pointers
    /// that do not target a pruneable component section.
    pub fn parse(ref_location: &str) -> Option<Self> {
        let fragment = ref_location.strip_prefix('#')?;
        let fragment = percent_decode_str(fragment).decode_utf8().ok()?;
        let pointer = Pointer::parse(&*fragment).ok()?;

        let mut tokens = pointer.tokens();
        if tokens.next()?.decoded() != "components" {
            return None;
        }
        let kind = ComponentKind::from_section(&tokens.next()?.decoded())?;
        let name = tokens.next()?.decoded().into_owned();

        Some(Self { kind, name })
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: Cow<'_, str> = if self.name.contains(['~', '/']) {
            Cow::Owned(self.name.replace('~', "~0").replace('/', "~1"))
        } else {
            Cow::Borrowed(&self.name)
        };
        write!(f, "#/components/{}/{name}", self.kind.section())
    }
}

/// Calls `visit` with every reference location found in `value`, depth first, in document order.
///
/// A location is either the value of a `$ref` key or a value of a `discriminator.mapping`
/// object. Mapping values that are bare schema names, like `Dog`, are visited as
/// `#/components/schemas/Dog`.
///
/// Keys next to a `$ref` are visited too, since OpenAPI 3.1 allows siblings such as
/// `description` that may themselves hold references.
pub fn visit_references<'a>(value: &'a Value, visit: &mut impl FnMut(Cow<'a, str>)) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map {
                match entry {
                    Value::String(location) if key == "$ref" => visit(Cow::Borrowed(location)),
                    Value::Object(discriminator) if key == "discriminator" => {
                        visit_mapping(discriminator, visit);
                        visit_references(entry, visit);
                    }
                    _ => visit_references(entry, visit),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                visit_references(item, visit);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}

fn visit_mapping<'a>(discriminator: &'a Map<String, Value>, visit: &mut impl FnMut(Cow<'a, str>)) {
    let Some(Value::Object(mapping)) = discriminator.get("mapping") else {
        return;
    };
    for target in mapping.values().filter_map(Value::as_str) {
        if target.contains(['#', '/']) {
            visit(Cow::Borrowed(target));
        } else {
            let location = ComponentRef::new(ComponentKind::Schema, target).to_string();
            visit(Cow::Owned(location));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("#/components/schemas/User", ComponentKind::Schema, "User")]
    #[case("#/components/responses/NotFound", ComponentKind::Response, "NotFound")]
    #[case("#/components/parameters/limit", ComponentKind::Parameter, "limit")]
    #[case("#/components/requestBodies/NewPet", ComponentKind::RequestBody, "NewPet")]
    #[case("#/components/headers/X-Rate-Limit", ComponentKind::Header, "X-Rate-Limit")]
    #[case("#/components/examples/cat", ComponentKind::Example, "cat")]
    #[case("#/components/schemas/User/properties/id", ComponentKind::Schema, "User")]
    #[case("#/components/schemas/a~1b~0c", ComponentKind::Schema, "a/b~c")]
    #[case("#/components/schemas/My%20Type", ComponentKind::Schema, "My Type")]
    fn should_parse_component_reference(
        #[case] location: &str,
        #[case] kind: ComponentKind,
        #[case] name: &str,
    ) {
        assert_eq!(
            ComponentRef::parse(location),
            Some(ComponentRef::new(kind, name))
        );
    }

    #[rstest]
    #[case::external_file("common.yaml#/components/schemas/Error")]
    #[case::external_url("https://example.com/api.json#/components/schemas/Error")]
    #[case::not_a_pointer("User")]
    #[case::not_components("#/paths/~1users/get")]
    #[case::unknown_section("#/components/securitySchemes/key")]
    #[case::section_only("#/components/schemas")]
    #[case::root("#")]
    fn should_ignore_other_references(#[case] location: &str) {
        assert_eq!(ComponentRef::parse(location), None);
    }

    #[test]
    fn should_escape_names_when_displayed() {
        let reference = ComponentRef::new(ComponentKind::Schema, "a/b~c");

        insta::assert_snapshot!(reference, @"#/components/schemas/a~1b~0c");
        assert_eq!(
            ComponentRef::parse(&reference.to_string()),
            Some(reference)
        );
    }

    #[test]
    fn should_visit_nested_references() {
        let value = json!({
            "parameters": [{ "$ref": "#/components/parameters/limit" }],
            "requestBody": { "$ref": "#/components/requestBodies/NewPet" },
            "responses": {
                "200": {
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Pet" }
                            }
                        }
                    }
                }
            },
            "x-note": "$ref is only special as a key"
        });

        let mut found = Vec::new();
        visit_references(&value, &mut |location| found.push(location));

        assert_eq!(
            found,
            vec![
                "#/components/parameters/limit",
                "#/components/requestBodies/NewPet",
                "#/components/schemas/Pet",
            ]
        );
    }

    #[test]
    fn should_visit_discriminator_mapping() {
        let value = json!({
            "oneOf": [{ "$ref": "#/components/schemas/Cat" }],
            "discriminator": {
                "propertyName": "kind",
                "mapping": {
                    "cat": "#/components/schemas/Cat",
                    "dog": "Dog",
                    "bird": "birds.yaml#/Bird"
                }
            },
            "properties": {
                "discriminator": { "type": "string" }
            }
        });

        let mut found = Vec::new();
        visit_references(&value, &mut |location| found.push(location));

        assert_eq!(
            found,
            vec![
                "#/components/schemas/Cat",
                "#/components/schemas/Cat",
                "#/components/schemas/Dog",
                "birds.yaml#/Bird",
            ]
        );
    }

    #[test]
    fn should_order_kinds_by_section() {
        assert_eq!(ComponentKind::from_section("requestBodies"), Some(ComponentKind::RequestBody));
        assert_eq!(ComponentKind::from_section("securitySchemes"), None);
        assert_eq!(ComponentKind::RequestBody.to_string(), "request body");
    }
}
