use nested_set_storage::{
    Direction, Field, FieldUpdate, NestedSetNode, NodeFilter, NodeQuery, Operator,
};

use crate::{
    DependentBehavior, Interval, NestedSetConfig, NestedSetError, TreeHooks, TreeStore,
};

/// Per-call switches for [destroy].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestroyOptions {
    /// Destroy descendants one by one, leaves first, notifying observers for
    /// each. Otherwise they are removed by a single bulk delete.
    pub cascade: bool,
}

impl From<&NestedSetConfig> for DestroyOptions {
    fn from(config: &NestedSetConfig) -> Self {
        Self {
            cascade: config.dependent == DependentBehavior::Destroy,
        }
    }
}

/// The result of a [destroy] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyOutcome<Record> {
    /// The node is gone
    Destroyed {
        /// The node as it was before it was removed
        node: Record,
        /// How many records were removed, the node included
        removed: usize,
    },
    /// There was no such node; nothing was done
    AlreadyGone,
}

/// Remove the node identified by `node_id` along with its whole subtree, then
/// close the gap it leaves on the boundary line.
///
/// Destroying a node that is no longer stored is a no-op, so a cascade that
/// reaches a node twice removes it once and compacts once.
pub async fn destroy<Store>(
    store: &mut Store,
    config: &NestedSetConfig,
    hooks: &TreeHooks<Store::Record>,
    node_id: &Store::Id,
    options: DestroyOptions,
) -> Result<DestroyOutcome<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    let Some(node) = store.get(node_id).await? else {
        tracing::debug!(node = %node_id, "Node already destroyed");
        return Ok(DestroyOutcome::AlreadyGone);
    };
    let interval = Interval::of(&node)?;
    let scope = config.filter_for(&node);
    let inside = scope
        .clone()
        .left(Operator::Gt, interval.left)
        .right(Operator::Lt, interval.right);

    let mut removed = if options.cascade {
        let descendants = store
            .find(
                &NodeQuery::from(inside)
                    .order_by(Field::Right, Direction::Ascending)
                    .order_by(Field::Id, Direction::Ascending),
            )
            .await?;
        let mut removed = 0;
        for descendant in descendants {
            hooks.run_on_destroy(&descendant);
            removed += store
                .delete(&NodeFilter::default().id(descendant.id().clone()))
                .await?;
        }
        removed
    } else {
        store.delete(&inside).await?
    };

    hooks.run_on_destroy(&node);
    removed += store
        .delete(&NodeFilter::default().id(node_id.clone()))
        .await?;

    compact(store, scope, interval).await?;

    Ok(DestroyOutcome::Destroyed { node, removed })
}

/// Shift every boundary beyond `interval` down by its width.
///
/// Lefts and rights are shifted in two separate passes. A concurrent writer
/// can observe the scope between them.
async fn compact<Store>(
    store: &mut Store,
    scope: NodeFilter<Store::Id>,
    interval: Interval,
) -> Result<(), NestedSetError>
where
    Store: TreeStore,
{
    let width = interval.width();
    tracing::debug!(right = interval.right, width, "Compacting boundaries");

    let lefts = store
        .find(&NodeQuery::from(
            scope.clone().left(Operator::Gt, interval.right),
        ))
        .await?;
    for record in lefts {
        if let Some(left) = record.left() {
            store
                .update(record.id(), FieldUpdate::Left(left - width))
                .await?;
        }
    }

    let rights = store
        .find(&NodeQuery::from(scope.right(Operator::Gt, interval.right)))
        .await?;
    for record in rights {
        if let Some(right) = record.right() {
            store
                .update(record.id(), FieldUpdate::Right(right - width))
                .await?;
        }
    }

    Ok(())
}
