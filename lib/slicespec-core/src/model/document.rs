use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ComponentKind, ComponentRef};
use crate::SliceError;

/// Ordered mapping from a path template to its [`PathItem`].
pub type Paths = IndexMap<String, PathItem>;

/// An OpenAPI document.
///
/// The document owns its paths, component sections and tag descriptions.
/// Slicing and pruning mutate it in place: clone it first to keep the original.
///
/// # Example
///
/// ```rust
/// use slicespec_core::{Document, HttpMethod, Operation, PathItem};
///
/// let document = Document::new("3.1.0").with_path(
///     "/users",
///     PathItem::new().with_operation(HttpMethod::Get, Operation::new().with_operation_id("listUsers")),
/// );
///
/// assert_eq!(document.openapi_version(), Some("3.1.0"));
/// assert_eq!(document.operation_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Top-level keys not modelled explicitly (`openapi`, `info`, `servers`, `webhooks`...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// The paths, in document order.
    #[serde(default)]
    pub paths: Paths,

    /// Reusable definitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    /// Top-level tag descriptions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl Document {
    /// Creates an empty document declaring the given `openapi` version.
    pub fn new(openapi: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("openapi".to_string(), Value::String(openapi.into()));
        Self {
            extra,
            ..Self::default()
        }
    }

    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::InvalidDocument`] with the location of the failure
    /// if the text is not a JSON document matching the model.
    pub fn from_json(json: &str) -> Result<Self, SliceError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let document: Self = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|err| SliceError::invalid(err.path().to_string(), err.inner().to_string()))?;
        deserializer
            .end()
            .map_err(|err| SliceError::invalid(".", err.to_string()))?;

        Ok(document)
    }

    /// Builds a document from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::InvalidDocument`] if the value does not match the model.
    pub fn from_value(value: Value) -> Result<Self, SliceError> {
        serde_path_to_error::deserialize(value)
            .map_err(|err| SliceError::invalid(err.path().to_string(), err.inner().to_string()))
    }

    /// Converts the document into a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::JsonError`] if serialization fails.
    pub fn to_value(&self) -> Result<Value, SliceError> {
        let value = serde_json::to_value(self)?;
        Ok(value)
    }

    /// Serializes the document into pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::JsonError`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, SliceError> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    /// The declared `openapi` version, if any.
    pub fn openapi_version(&self) -> Option<&str> {
        self.extra.get("openapi").and_then(Value::as_str)
    }

    /// Adds (or replaces) a path item.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>, item: PathItem) -> Self {
        self.paths.insert(path.into(), item);
        self
    }

    /// Adds (or replaces) a component definition.
    #[must_use]
    pub fn with_component(
        mut self,
        kind: ComponentKind,
        name: impl Into<String>,
        definition: Value,
    ) -> Self {
        self.components
            .get_or_insert_with(Components::default)
            .section_mut(kind)
            .insert(name.into(), definition);
        self
    }

    /// Adds a top-level tag description.
    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Iterates over every operation with its path and method, in document order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpMethod, &Operation)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations()
                .map(move |(method, operation)| (path.as_str(), method, operation))
        })
    }

    /// Number of operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(PathItem::operation_count).sum()
    }

    /// Looks up the definition a component reference points to.
    pub fn component(&self, reference: &ComponentRef) -> Option<&Value> {
        self.components
            .as_ref()
            .and_then(|components| components.section(reference.kind).get(&reference.name))
    }

    /// Returns the top-level tag description with the given name.
    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.name == name)
    }
}

/// The operations available on a single path.
///
/// Each HTTP method has its own slot. Path-level keys such as `summary`,
/// `servers` or shared `parameters` are kept verbatim in [`PathItem::extra`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// Path-level keys not modelled explicitly.
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delete: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    head: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    patch: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trace: Option<Operation>,
}

impl PathItem {
    /// Creates a path item without operations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation for a method.
    #[must_use]
    pub fn with_operation(mut self, method: HttpMethod, operation: Operation) -> Self {
        self.set_operation(method, operation);
        self
    }

    fn slot(&self, method: HttpMethod) -> &Option<Operation> {
        match method {
            HttpMethod::Get => &self.get,
            HttpMethod::Put => &self.put,
            HttpMethod::Post => &self.post,
            HttpMethod::Delete => &self.delete,
            HttpMethod::Options => &self.options,
            HttpMethod::Head => &self.head,
            HttpMethod::Patch => &self.patch,
            HttpMethod::Trace => &self.trace,
        }
    }

    fn slot_mut(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Trace => &mut self.trace,
        }
    }

    /// The operation bound to `method`, if any.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.slot(method).as_ref()
    }

    /// Mutable access to the operation bound to `method`.
    pub fn operation_mut(&mut self, method: HttpMethod) -> Option<&mut Operation> {
        self.slot_mut(method).as_mut()
    }

    /// Binds an operation to `method`, returning the previous one.
    pub fn set_operation(&mut self, method: HttpMethod, operation: Operation) -> Option<Operation> {
        self.slot_mut(method).replace(operation)
    }

    /// Clears the slot of `method`, returning the removed operation.
    pub fn remove_operation(&mut self, method: HttpMethod) -> Option<Operation> {
        self.slot_mut(method).take()
    }

    /// Iterates over the bound operations in method order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |method| self.operation(method).map(|operation| (method, operation)))
    }

    /// Number of bound operations.
    pub fn operation_count(&self) -> usize {
        self.operations().count()
    }

    /// Returns `true` if at least one method has an operation.
    pub fn has_operations(&self) -> bool {
        HttpMethod::ALL
            .into_iter()
            .any(|method| self.slot(method).is_some())
    }
}

/// HTTP methods that can carry an operation in a [`PathItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
    /// `TRACE`
    Trace,
}

impl HttpMethod {
    /// Every method, in the order the OpenAPI specification lists them.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// The lowercase key used for this method in a path item.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// A single API operation.
///
/// Only the identifier and the tags are typed; the rest of the operation
/// (parameters, request body, responses, callbacks...) is kept as JSON in
/// [`Operation::body`], which is where `$ref` expressions are found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Tag names used to group the operation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Identifier, unique within a document when present.
    #[serde(
        rename = "operationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_id: Option<String>,

    /// Remaining keys of the operation.
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Operation {
    /// Creates an operation without id, tags or body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation identifier.
    #[must_use]
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds (or replaces) a key of the operation body.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.body.insert(key.into(), value);
        self
    }

    /// The operation identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Returns `true` if the operation lists `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|it| it == tag)
    }
}

/// Reusable definitions of a document.
///
/// The sections addressable by a [`ComponentRef`] are typed so they can be pruned;
/// other sections (`securitySchemes`, `links`, `callbacks`, `pathItems`...) are kept verbatim
/// in [`Components::extra`] and never pruned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// `#/components/schemas`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Value>,

    /// `#/components/responses`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Value>,

    /// `#/components/parameters`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Value>,

    /// `#/components/requestBodies`
    #[serde(
        rename = "requestBodies",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub request_bodies: IndexMap<String, Value>,

    /// `#/components/headers`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Value>,

    /// `#/components/examples`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, Value>,

    /// Sections that are never pruned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Components {
    /// The entries of a pruneable section.
    pub fn section(&self, kind: ComponentKind) -> &IndexMap<String, Value> {
        match kind {
            ComponentKind::Schema => &self.schemas,
            ComponentKind::Response => &self.responses,
            ComponentKind::Parameter => &self.parameters,
            ComponentKind::RequestBody => &self.request_bodies,
            ComponentKind::Header => &self.headers,
            ComponentKind::Example => &self.examples,
        }
    }

    /// Mutable access to the entries of a pruneable section.
    pub fn section_mut(&mut self, kind: ComponentKind) -> &mut IndexMap<String, Value> {
        match kind {
            ComponentKind::Schema => &mut self.schemas,
            ComponentKind::Response => &mut self.responses,
            ComponentKind::Parameter => &mut self.parameters,
            ComponentKind::RequestBody => &mut self.request_bodies,
            ComponentKind::Header => &mut self.headers,
            ComponentKind::Example => &mut self.examples,
        }
    }

    /// Returns `true` if no section has any entry.
    pub fn is_empty(&self) -> bool {
        self.extra.is_empty()
            && ComponentKind::ALL
                .into_iter()
                .all(|kind| self.section(kind).is_empty())
    }
}

/// A top-level tag description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// The tag name, as listed by operations.
    pub name: String,

    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Remaining keys (`externalDocs`, extensions...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tag {
    /// Creates a tag description without description text.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            extra: Map::new(),
        }
    }

    /// Sets the description text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
