use nested_set_storage::{Direction, Field, NestedSetNode, NodeFilter, NodeQuery, ScopeKey};

use crate::{Interval, NestedSetError, TreeStore};

/// Allocate boundaries for a node that is about to be created in `scope`.
///
/// The node is placed after everything else in the scope: `(max + 1, max + 2)`
/// where `max` is the largest right boundary currently stored (0 when the
/// scope is empty). Nothing is written.
pub async fn allocate<Store>(store: &Store, scope: &ScopeKey) -> Result<Interval, NestedSetError>
where
    Store: TreeStore,
{
    let query = NodeQuery::from(NodeFilter::in_scope(scope.clone()))
        .order_by(Field::Right, Direction::Descending)
        .limit(1);

    let max_right = store
        .find(&query)
        .await?
        .first()
        .and_then(|node| node.right())
        .unwrap_or(0);

    tracing::debug!(%scope, max_right, "Allocating boundaries at the tail of the scope");

    Ok(Interval::new(max_right + 1, max_right + 2))
}
