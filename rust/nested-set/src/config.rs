use nested_set_storage::{NestedSetNode, NodeFilter, ScopeKey};
use serde::{Deserialize, Serialize};

use crate::NestedSetError;

/// What happens to the descendants of a destroyed node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependentBehavior {
    /// Remove every record inside the node's interval with one bulk delete,
    /// without notifying destroy observers for them
    #[default]
    DeleteAll,
    /// Destroy each descendant individually, leaves first
    Destroy,
}

/// The immutable configuration of a nested set tree.
///
/// It is passed to every operation; nothing about a tree is configured
/// through shared mutable state. It can be read from JSON:
///
/// ```rust
/// use nested_set::{DependentBehavior, NestedSetConfig};
///
/// let config: NestedSetConfig =
///     serde_json::from_str(r#"{ "scope": ["organization_id"], "dependent": "destroy" }"#)
///         .unwrap();
///
/// assert_eq!(config.scope, vec!["organization_id".to_owned()]);
/// assert_eq!(config.dependent, DependentBehavior::Destroy);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestedSetConfig {
    /// The attribute names whose values partition records into independent
    /// trees. Empty means the whole store is one forest.
    pub scope: Vec<String>,
    /// The default descendant policy of [crate::destroy]
    pub dependent: DependentBehavior,
}

impl NestedSetConfig {
    /// An unscoped configuration that bulk deletes descendants
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition the tree by the given attribute names
    pub fn scoped_by<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the default descendant policy
    pub fn with_dependent(mut self, dependent: DependentBehavior) -> Self {
        self.dependent = dependent;
        self
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, NestedSetError> {
        serde_json::from_str(json).map_err(|error| NestedSetError::Configuration(format!("{error}")))
    }

    /// The scope that `node` belongs to
    pub fn scope_of<Node>(&self, node: &Node) -> ScopeKey
    where
        Node: NestedSetNode + ?Sized,
    {
        node.scope_key(&self.scope)
    }

    /// A filter restricted to the scope of `node`
    pub fn filter_for<Node>(&self, node: &Node) -> NodeFilter<Node::Id>
    where
        Node: NestedSetNode + ?Sized,
    {
        NodeFilter::in_scope(self.scope_of(node))
    }

    /// True if both nodes live in the same scope
    pub fn same_scope<A, B>(&self, a: &A, b: &B) -> bool
    where
        A: NestedSetNode + ?Sized,
        B: NestedSetNode + ?Sized,
    {
        self.scope_of(a) == self.scope_of(b)
    }
}

#[cfg(test)]
mod tests {
    use nested_set_storage::{Node, ScopeKey};

    use crate::{DependentBehavior, NestedSetConfig};

    #[test]
    fn it_defaults_to_an_unscoped_bulk_deleting_tree() {
        let config = NestedSetConfig::from_json("{}").unwrap();

        assert_eq!(config, NestedSetConfig::new());
        assert_eq!(config.dependent, DependentBehavior::DeleteAll);
        assert!(config.scope_of(&Node::new(1u64)).is_unscoped());
    }

    #[test]
    fn it_rejects_unknown_dependent_policies() {
        assert!(NestedSetConfig::from_json(r#"{ "dependent": "nullify" }"#).is_err());
    }

    #[test]
    fn it_compares_scopes_by_configured_attributes_only() {
        let config = NestedSetConfig::new().scoped_by(["organization_id"]);
        let a = Node::new(1u64)
            .with_attribute("organization_id", "acme")
            .with_attribute("name", "a");
        let b = Node::new(2u64)
            .with_attribute("organization_id", "acme")
            .with_attribute("name", "b");
        let c = Node::new(3u64).with_attribute("organization_id", "globex");

        assert!(config.same_scope(&a, &b));
        assert!(!config.same_scope(&a, &c));
        assert_eq!(
            config.scope_of(&a),
            ScopeKey::new([("organization_id", "acme")])
        );
    }
}
