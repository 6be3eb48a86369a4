use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Operation;

/// Regular expression for matching path placeholders in the format `{name}`.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}/]*\}").expect("a valid regex"));

/// Replaces every `{placeholder}` of a path template with `{}`.
///
/// Two templates differing only by placeholder names normalize identically.
/// The result is only meant for comparisons: stored paths are never rewritten.
///
/// ```rust
/// use slicespec_core::normalize_path;
///
/// assert_eq!(normalize_path("/a/{x}/b/{y}"), "/a/{}/b/{}");
/// assert_eq!(normalize_path("/a/{x}/b/{y}"), normalize_path("/a/{foo}/b/{bar}"));
/// ```
pub fn normalize_path(path: &str) -> String {
    PLACEHOLDER.replace_all(path, "{}").into_owned()
}

/// Selects the operations to keep when slicing.
///
/// The three lists are independent predicates combined with OR: an operation is
/// kept as soon as one of them matches. A criteria without any entry matches nothing.
///
/// Criteria can be built in code or deserialized (`operationIds`, `tags` and `paths` keys):
///
/// ```rust
/// use slicespec_core::Criteria;
///
/// let criteria = Criteria::new()
///     .with_tag("Groups")
///     .with_operation_id("getUser")
///     .with_path("/users/{id}/avatar");
///
/// let from_json: Criteria = serde_json::from_str(
///     r#"{ "tags": ["Groups"], "operationIds": ["getUser"], "paths": ["/users/{id}/avatar"] }"#,
/// )?;
/// assert_eq!(criteria, from_json);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    /// Operation identifiers to keep.
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub operation_ids: IndexSet<String>,

    /// Tags to keep: an operation listing any of them is kept.
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub tags: IndexSet<String>,

    /// Path templates to keep, compared after [`normalize_path`].
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub paths: IndexSet<String>,
}

impl Criteria {
    /// Creates a criteria matching nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operation identifier.
    #[must_use]
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_ids.insert(operation_id.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Adds a path template.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.insert(path.into());
        self
    }

    /// Extends this criteria with every entry of `other`.
    pub fn extend(&mut self, other: Self) {
        self.operation_ids.extend(other.operation_ids);
        self.tags.extend(other.tags);
        self.paths.extend(other.paths);
    }

    /// Returns `true` if no list has an entry, in which case nothing matches.
    pub fn is_empty(&self) -> bool {
        self.operation_ids.is_empty() && self.tags.is_empty() && self.paths.is_empty()
    }

    /// Decides whether the operation at `path` is kept.
    ///
    /// An absent operation never matches.
    pub fn matches(&self, path: &str, operation: Option<&Operation>) -> bool {
        let Some(operation) = operation else {
            return false;
        };

        self.matches_path(path) || self.matches_operation_id(operation) || self.matches_tags(operation)
    }

    fn matches_path(&self, path: &str) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        let normalized = normalize_path(path);
        self.paths
            .iter()
            .any(|pattern| normalize_path(pattern) == normalized)
    }

    fn matches_operation_id(&self, operation: &Operation) -> bool {
        operation
            .id()
            .is_some_and(|id| self.operation_ids.contains(id))
    }

    fn matches_tags(&self, operation: &Operation) -> bool {
        operation.tags.iter().any(|tag| self.tags.contains(tag))
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<nothing>");
        }

        let mut parts = Vec::new();
        if !self.operation_ids.is_empty() {
            parts.push(format!("operationIds={:?}", self.operation_ids));
        }
        if !self.tags.is_empty() {
            parts.push(format!("tags={:?}", self.tags));
        }
        if !self.paths.is_empty() {
            parts.push(format!("paths={:?}", self.paths));
        }
        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/a/{x}/b/{y}", "/a/{}/b/{}")]
    #[case("/a/{foo}/b/{bar}", "/a/{}/b/{}")]
    #[case("/users", "/users")]
    #[case("/users/{user-id}.json", "/users/{}.json")]
    #[case("/files/{name}{ext}", "/files/{}{}")]
    #[case("/already/{}", "/already/{}")]
    #[case("", "")]
    fn should_normalize_path(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(normalize_path(path), expected);
    }

    #[test]
    fn should_keep_literal_segments() {
        assert_ne!(normalize_path("/users/{id}"), normalize_path("/groups/{id}"));
        assert_ne!(normalize_path("/users/{id}"), normalize_path("/users/{id}/"));
    }

    fn operation(id: Option<&str>, tags: &[&str]) -> Operation {
        let mut operation = Operation::new();
        operation.operation_id = id.map(ToString::to_string);
        operation.tags = tags.iter().map(ToString::to_string).collect();
        operation
    }

    #[rstest]
    #[case::tag_among_others(&["Groups", "Other"], true)]
    #[case::single_tag(&["Groups"], true)]
    #[case::other_tag(&["Other"], false)]
    #[case::no_tag(&[], false)]
    fn should_match_by_tag(#[case] tags: &[&str], #[case] expected: bool) {
        let criteria = Criteria::new().with_tag("Groups");

        assert_eq!(
            criteria.matches("/groups", Some(&operation(None, tags))),
            expected
        );
    }

    #[test]
    fn should_match_by_operation_id() {
        let criteria = Criteria::new().with_operation_id("getUser");

        assert!(criteria.matches("/users/{id}", Some(&operation(Some("getUser"), &[]))));
        assert!(!criteria.matches("/users/{id}", Some(&operation(Some("getUsers"), &[]))));
        assert!(!criteria.matches("/users/{id}", Some(&operation(None, &[]))));
    }

    #[test]
    fn should_match_by_normalized_path() {
        let criteria = Criteria::new().with_path("/users/{user_id}/posts/{post_id}");

        assert!(criteria.matches("/users/{id}/posts/{slug}", Some(&operation(None, &[]))));
        assert!(!criteria.matches("/users/{id}/posts", Some(&operation(None, &[]))));
    }

    #[test]
    fn should_combine_predicates_with_or() {
        let criteria = Criteria::new()
            .with_operation_id("createOrder")
            .with_tag("users")
            .with_path("/health");

        assert!(criteria.matches("/orders", Some(&operation(Some("createOrder"), &["orders"]))));
        assert!(criteria.matches("/me", Some(&operation(Some("me"), &["users"]))));
        assert!(criteria.matches("/health", Some(&operation(None, &[]))));
        assert!(!criteria.matches("/orders", Some(&operation(Some("listOrders"), &["orders"]))));
    }

    #[test]
    fn should_match_nothing_when_empty() {
        let criteria = Criteria::new();

        assert!(criteria.is_empty());
        assert!(!criteria.matches("/users", Some(&operation(Some("listUsers"), &["users"]))));
    }

    #[test]
    fn should_never_match_absent_operation() {
        let criteria = Criteria::new().with_path("/users");

        assert!(!criteria.matches("/users", None));
    }

    #[test]
    fn should_extend_criteria() {
        let mut criteria = Criteria::new().with_tag("a");
        criteria.extend(Criteria::new().with_tag("a").with_path("/b"));

        assert_eq!(criteria, Criteria::new().with_tag("a").with_path("/b"));
    }

    #[test]
    fn should_display_criteria() {
        let criteria = Criteria::new().with_tag("users").with_path("/health");

        insta::assert_snapshot!(criteria, @r#"tags={"users"} paths={"/health"}"#);
        insta::assert_snapshot!(Criteria::new(), @"<nothing>");
    }
}
