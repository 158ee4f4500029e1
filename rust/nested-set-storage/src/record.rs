use std::{collections::BTreeMap, fmt::Debug, fmt::Display, hash::Hash};

use serde::{Deserialize, Serialize};

use crate::{ConditionalSync, ScopeKey, ScopeValue};

/// A boundary number. Every node owns two of them: its left and its right.
pub type Boundary = i64;

/// The bounds on a type that can identify a node.
pub trait NodeId: Clone + Eq + Ord + Hash + Debug + Display + ConditionalSync + 'static {}

impl<T> NodeId for T where T: Clone + Eq + Ord + Hash + Debug + Display + ConditionalSync + 'static
{}

/// The read-side capability every nested set node exposes.
///
/// Any record type can take part in a tree by reporting its identity, its
/// parent reference, its two boundaries and the attributes that make up its
/// scope. Boundaries are optional so that records written before the tree
/// allocated them (or damaged since) can still be inspected and repaired.
pub trait NestedSetNode {
    /// The identity type of this node
    type Id: NodeId;

    /// The identity of this node
    fn id(&self) -> &Self::Id;

    /// The identity of this node's parent, or `None` for a root
    fn parent_id(&self) -> Option<&Self::Id>;

    /// The left boundary, if one has been allocated
    fn left(&self) -> Option<Boundary>;

    /// The right boundary, if one has been allocated
    fn right(&self) -> Option<Boundary>;

    /// The value of a named scope attribute, if the record carries it
    fn attribute(&self, name: &str) -> Option<ScopeValue>;

    /// The scope this node belongs to, given the configured attribute names
    fn scope_key(&self, attributes: &[String]) -> ScopeKey {
        ScopeKey::of(self, attributes)
    }
}

/// A single-field, in-place change to a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<Id> {
    /// Set the left boundary
    Left(Boundary),
    /// Set the right boundary
    Right(Boundary),
    /// Set (or clear) the parent reference
    Parent(Option<Id>),
}

/// A [NestedSetNode] that a store can hold and patch in place.
pub trait NestedSetRecord: NestedSetNode + Clone + ConditionalSync {
    /// Apply a partial update to this record
    fn apply(&mut self, update: FieldUpdate<Self::Id>);
}

/// A general purpose record type: an id, a parent reference, two boundaries
/// and a bag of attributes (some of which may form the scope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node<Id> {
    /// The identity of the node
    pub id: Id,
    /// The parent reference
    #[serde(default)]
    pub parent_id: Option<Id>,
    /// The left boundary
    #[serde(default, rename = "lft")]
    pub left: Option<Boundary>,
    /// The right boundary
    #[serde(default, rename = "rgt")]
    pub right: Option<Boundary>,
    /// Any other attributes
    #[serde(default)]
    pub attributes: BTreeMap<String, ScopeValue>,
}

impl<Id> Node<Id> {
    /// A root node with no boundaries and no attributes
    pub fn new(id: Id) -> Self {
        Self {
            id,
            parent_id: None,
            left: None,
            right: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the parent reference
    pub fn with_parent(mut self, parent_id: Id) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set both boundaries. Meant for fixtures and imports; trees allocate
    /// boundaries themselves.
    pub fn with_bounds(mut self, left: Boundary, right: Boundary) -> Self {
        self.left = Some(left);
        self.right = Some(right);
        self
    }

    /// Set an attribute
    pub fn with_attribute<K, V>(mut self, name: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<ScopeValue>,
    {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl<Id> NestedSetNode for Node<Id>
where
    Id: NodeId,
{
    type Id = Id;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn parent_id(&self) -> Option<&Self::Id> {
        self.parent_id.as_ref()
    }

    fn left(&self) -> Option<Boundary> {
        self.left
    }

    fn right(&self) -> Option<Boundary> {
        self.right
    }

    fn attribute(&self, name: &str) -> Option<ScopeValue> {
        self.attributes.get(name).cloned()
    }
}

impl<Id> NestedSetRecord for Node<Id>
where
    Id: NodeId,
{
    fn apply(&mut self, update: FieldUpdate<Self::Id>) {
        match update {
            FieldUpdate::Left(left) => self.left = Some(left),
            FieldUpdate::Right(right) => self.right = Some(right),
            FieldUpdate::Parent(parent_id) => self.parent_id = parent_id,
        }
    }
}
