use std::cmp::Ordering;

use crate::{Boundary, NestedSetNode, ScopeKey};

/// A comparison operator usable against a boundary field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
}

impl Operator {
    /// Evaluate `lhs <op> rhs`
    pub fn evaluate(&self, lhs: Boundary, rhs: Boundary) -> bool {
        match self {
            Operator::Lt => lhs < rhs,
            Operator::Le => lhs <= rhs,
            Operator::Gt => lhs > rhs,
            Operator::Ge => lhs >= rhs,
            Operator::Eq => lhs == rhs,
        }
    }
}

/// One clause of a [NodeFilter]. A record matches a filter when it matches
/// every clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition<Id> {
    /// Compare the left boundary to a value
    Left(Operator, Boundary),
    /// Compare the right boundary to a value
    Right(Operator, Boundary),
    /// Require a specific parent reference (`None` selects roots)
    Parent(Option<Id>),
    /// Require a specific identity
    Id(Id),
}

/// A conjunction of [Condition]s, restricted to a [ScopeKey].
///
/// Records whose boundary is unallocated never satisfy a boundary
/// comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFilter<Id> {
    /// The scope to restrict matches to
    pub scope: ScopeKey,
    /// The clauses that must all hold
    pub conditions: Vec<Condition<Id>>,
}

impl<Id> Default for NodeFilter<Id> {
    fn default() -> Self {
        Self {
            scope: ScopeKey::unscoped(),
            conditions: Vec::new(),
        }
    }
}

impl<Id> NodeFilter<Id>
where
    Id: PartialEq,
{
    /// A filter matching every record in `scope`
    pub fn in_scope(scope: ScopeKey) -> Self {
        Self {
            scope,
            conditions: Vec::new(),
        }
    }

    /// Add a comparison against the left boundary
    pub fn left(mut self, operator: Operator, value: Boundary) -> Self {
        self.conditions.push(Condition::Left(operator, value));
        self
    }

    /// Add a comparison against the right boundary
    pub fn right(mut self, operator: Operator, value: Boundary) -> Self {
        self.conditions.push(Condition::Right(operator, value));
        self
    }

    /// Require the given parent reference
    pub fn parent(mut self, parent_id: Option<Id>) -> Self {
        self.conditions.push(Condition::Parent(parent_id));
        self
    }

    /// Require the given identity
    pub fn id(mut self, id: Id) -> Self {
        self.conditions.push(Condition::Id(id));
        self
    }

    /// True if `node` satisfies the scope and every condition
    pub fn matches<Node>(&self, node: &Node) -> bool
    where
        Node: NestedSetNode<Id = Id> + ?Sized,
    {
        self.scope.matches(node)
            && self.conditions.iter().all(|condition| match condition {
                Condition::Left(operator, value) => node
                    .left()
                    .is_some_and(|left| operator.evaluate(left, *value)),
                Condition::Right(operator, value) => node
                    .right()
                    .is_some_and(|right| operator.evaluate(right, *value)),
                Condition::Parent(parent_id) => node.parent_id() == parent_id.as_ref(),
                Condition::Id(id) => node.id() == id,
            })
    }
}

/// A field that query results may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The left boundary
    Left,
    /// The right boundary
    Right,
    /// The identity
    Id,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// A [NodeFilter] together with an ordering and an optional limit.
///
/// Unallocated boundaries sort before allocated ones in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeQuery<Id> {
    /// Which records to select
    pub filter: NodeFilter<Id>,
    /// Sort keys, most significant first
    pub order: Vec<(Field, Direction)>,
    /// The maximum number of records to return
    pub limit: Option<usize>,
}

impl<Id> From<NodeFilter<Id>> for NodeQuery<Id> {
    fn from(filter: NodeFilter<Id>) -> Self {
        Self {
            filter,
            order: Vec::new(),
            limit: None,
        }
    }
}

impl<Id> NodeQuery<Id>
where
    Id: Ord,
{
    /// Append a sort key
    pub fn order_by(mut self, field: Field, direction: Direction) -> Self {
        self.order.push((field, direction));
        self
    }

    /// Limit the number of results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Compare two records according to this query's sort keys
    pub fn compare<Node>(&self, a: &Node, b: &Node) -> Ordering
    where
        Node: NestedSetNode<Id = Id>,
    {
        for (field, direction) in self.order.iter() {
            let ordering = match field {
                Field::Left => a.left().cmp(&b.left()),
                Field::Right => a.right().cmp(&b.right()),
                Field::Id => a.id().cmp(b.id()),
            };
            let ordering = match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Filter, sort and truncate a collection of records the way a backend
    /// is expected to
    pub fn select<Node, I>(&self, records: I) -> Vec<Node>
    where
        Node: NestedSetNode<Id = Id>,
        I: IntoIterator<Item = Node>,
    {
        let mut selected: Vec<Node> = records
            .into_iter()
            .filter(|record| self.filter.matches(record))
            .collect();

        selected.sort_by(|a, b| self.compare(a, b));

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }

        selected
    }
}
