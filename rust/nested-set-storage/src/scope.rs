use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::NestedSetNode;

/// The value of a single scope attribute on a record.
///
/// Records that lack an attribute are treated as carrying
/// [ScopeValue::Null] for it, so they still group together.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScopeValue {
    /// No value
    #[default]
    Null,
    /// A boolean value
    Bool(bool),
    /// An integer value
    Integer(i64),
    /// A textual value
    Text(String),
}

impl Display for ScopeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeValue::Null => write!(f, "null"),
            ScopeValue::Bool(value) => write!(f, "{value}"),
            ScopeValue::Integer(value) => write!(f, "{value}"),
            ScopeValue::Text(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<bool> for ScopeValue {
    fn from(value: bool) -> Self {
        ScopeValue::Bool(value)
    }
}

impl From<i64> for ScopeValue {
    fn from(value: i64) -> Self {
        ScopeValue::Integer(value)
    }
}

impl From<&str> for ScopeValue {
    fn from(value: &str) -> Self {
        ScopeValue::Text(value.to_owned())
    }
}

impl From<String> for ScopeValue {
    fn from(value: String) -> Self {
        ScopeValue::Text(value)
    }
}

impl<T> From<Option<T>> for ScopeValue
where
    T: Into<ScopeValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// A [ScopeKey] partitions the records of a store into independent forests,
/// each with its own boundary numbering space.
///
/// The key is the ordered list of `(attribute, value)` pairs named by the
/// tree configuration. The empty key is "unscoped": it matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScopeKey(Vec<(String, ScopeValue)>);

impl ScopeKey {
    /// The key that matches every record
    pub fn unscoped() -> Self {
        Self::default()
    }

    /// Build a key from `(attribute, value)` pairs
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ScopeValue>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Read the scope of `node` for the given attribute names
    pub fn of<Node>(node: &Node, attributes: &[String]) -> Self
    where
        Node: NestedSetNode + ?Sized,
    {
        Self(
            attributes
                .iter()
                .map(|name| (name.clone(), node.attribute(name).unwrap_or_default()))
                .collect(),
        )
    }

    /// True if this key places no constraint on records
    pub fn is_unscoped(&self) -> bool {
        self.0.is_empty()
    }

    /// The `(attribute, value)` pairs of this key
    pub fn iter(&self) -> impl Iterator<Item = &(String, ScopeValue)> {
        self.0.iter()
    }

    /// True if `node` carries every attribute value of this key
    pub fn matches<Node>(&self, node: &Node) -> bool
    where
        Node: NestedSetNode + ?Sized,
    {
        self.0
            .iter()
            .all(|(name, value)| node.attribute(name).unwrap_or_default() == *value)
    }
}

impl Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(unscoped)");
        }
        for (index, (name, value)) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}
