use nested_set_storage::{Boundary, FieldUpdate, NestedSetNode, NodeQuery, Operator};

use crate::{
    HookDecision, Interval, MoveEvent, MovePosition, NestedSetConfig, NestedSetError, TreeHooks,
    TreeStore,
};

/// The two adjacent boundary ranges a move exchanges.
///
/// `[a, b]` and `[c, d]` are disjoint and sit side by side on the boundary
/// line. One of them is the moved node's interval, the other is the gap
/// between that interval and the destination. Swapping their positions
/// relocates the subtree while every other boundary keeps its place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapPlan {
    /// Start of the lower range
    pub a: Boundary,
    /// End of the lower range
    pub b: Boundary,
    /// Start of the upper range
    pub c: Boundary,
    /// End of the upper range
    pub d: Boundary,
}

impl SwapPlan {
    /// Plan the swap that brings `node` to `bound`, or `None` if the node is
    /// already there.
    pub fn new(node: Interval, bound: Boundary) -> Option<Self> {
        let (bound, other_bound) = if bound > node.right {
            (bound - 1, node.right + 1)
        } else {
            (bound, node.left - 1)
        };

        if bound == node.right || bound == node.left {
            return None;
        }

        let mut edges = [node.left, node.right, bound, other_bound];
        edges.sort_unstable();
        let [a, b, c, d] = edges;

        Some(Self { a, b, c, d })
    }

    /// The whole stretch of the boundary line this swap rewrites
    pub fn span(&self) -> (Boundary, Boundary) {
        (self.a, self.d)
    }

    /// Where `boundary` ends up after the swap
    pub fn shift(&self, boundary: Boundary) -> Boundary {
        if self.a <= boundary && boundary <= self.b {
            boundary + (self.d - self.b)
        } else if self.c <= boundary && boundary <= self.d {
            boundary + (self.a - self.c)
        } else {
            boundary
        }
    }
}

/// The boundary that a move to `position` aims at
fn resolve_bound<Id>(position: &MovePosition<Id>, target: Option<Interval>) -> Option<Boundary> {
    match (position, target) {
        (MovePosition::ChildOf(_), Some(target)) => Some(target.right),
        (MovePosition::LeftOf(_), Some(target)) => Some(target.left),
        (MovePosition::RightOf(_), Some(target)) => Some(target.right + 1),
        (MovePosition::Root, _) => Some(1),
        _ => None,
    }
}

/// True if `node` could be moved next to or under `target`.
///
/// A node cannot target itself, a node in another scope, or anything inside
/// its own subtree.
pub fn move_possible<Node>(config: &NestedSetConfig, node: &Node, target: &Node) -> bool
where
    Node: NestedSetNode,
{
    if node.id() == target.id() || !config.same_scope(node, target) {
        return false;
    }

    match (Interval::of(node), Interval::of(target)) {
        (Ok(node), Ok(target)) => !(node.encloses(target.left) || node.encloses(target.right)),
        _ => false,
    }
}

/// Per-call switches for [move_node].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// Do not run move observers
    pub skip_hooks: bool,
}

/// The result of a [move_node] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome<Record> {
    /// The node was relocated; this is its new state
    Moved(Record),
    /// The node was already at the requested position
    Unchanged(Record),
    /// A pre-move observer vetoed the move; nothing was written
    Vetoed,
}

impl<Record> MoveOutcome<Record> {
    /// The node after the call, unless the move was vetoed
    pub fn node(&self) -> Option<&Record> {
        match self {
            MoveOutcome::Moved(node) | MoveOutcome::Unchanged(node) => Some(node),
            MoveOutcome::Vetoed => None,
        }
    }

    /// True if boundaries were rewritten
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved(_))
    }
}

/// Relocate the node identified by `node_id`, together with its subtree, to
/// `position`.
///
/// Both the node and its target are reloaded from the store first, so stale
/// copies held by the caller do not matter. Only records with a boundary
/// inside the swapped span are rewritten. The writes are not atomic: if the
/// call fails part way, the scope must be repaired with [crate::rebuild].
pub async fn move_node<Store>(
    store: &mut Store,
    config: &NestedSetConfig,
    hooks: &TreeHooks<Store::Record>,
    node_id: &Store::Id,
    position: &MovePosition<Store::Id>,
    options: MoveOptions,
) -> Result<MoveOutcome<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    let node = store
        .get(node_id)
        .await?
        .ok_or_else(|| NestedSetError::NotPersisted(format!("{node_id}")))?;

    if !options.skip_hooks
        && hooks.run_before_move(&MoveEvent {
            node: &node,
            position,
        }) == HookDecision::Veto
    {
        tracing::debug!(node = %node_id, "Move vetoed by observer");
        return Ok(MoveOutcome::Vetoed);
    }

    let interval = Interval::of(&node)?;

    let target = match position.target() {
        Some(target_id) => Some(
            store
                .get(target_id)
                .await?
                .ok_or_else(|| NestedSetError::NotFound(format!("{target_id}")))?,
        ),
        None => None,
    };

    if let Some(target) = target.as_ref() {
        if !config.same_scope(&node, target) {
            return Err(NestedSetError::ScopeMismatch(format!(
                "{node_id} is in {}, {} is in {}",
                config.scope_of(&node),
                target.id(),
                config.scope_of(target)
            )));
        }
        if !move_possible(config, &node, target) {
            return Err(NestedSetError::ImpossibleMove(format!(
                "{node_id} to {} of {}",
                position.placement(),
                target.id()
            )));
        }
    }

    let target_interval = target.as_ref().map(Interval::of).transpose()?;
    let bound = resolve_bound(position, target_interval)
        .ok_or_else(|| NestedSetError::MissingTarget(position.placement().to_string()))?;

    let new_parent = match position {
        MovePosition::ChildOf(target_id) => Some(target_id.clone()),
        MovePosition::LeftOf(_) | MovePosition::RightOf(_) => target
            .as_ref()
            .and_then(|target| target.parent_id().cloned()),
        MovePosition::Root => None,
    };

    let Some(plan) = SwapPlan::new(interval, bound) else {
        tracing::debug!(node = %node_id, bound, "Node is already in position");
        return Ok(MoveOutcome::Unchanged(node));
    };

    let (start, end) = plan.span();
    tracing::debug!(
        node = %node_id,
        a = plan.a,
        b = plan.b,
        c = plan.c,
        d = plan.d,
        "Swapping boundary ranges"
    );

    let scope = config.filter_for(&node);
    let lefts = store
        .find(&NodeQuery::from(
            scope
                .clone()
                .left(Operator::Ge, start)
                .left(Operator::Le, end),
        ))
        .await?;
    let rights = store
        .find(&NodeQuery::from(
            scope.right(Operator::Ge, start).right(Operator::Le, end),
        ))
        .await?;

    for record in lefts {
        if let Some(left) = record.left() {
            store
                .update(record.id(), FieldUpdate::Left(plan.shift(left)))
                .await?;
        }
    }
    for record in rights {
        if let Some(right) = record.right() {
            store
                .update(record.id(), FieldUpdate::Right(plan.shift(right)))
                .await?;
        }
    }

    store
        .update(node_id, FieldUpdate::Parent(new_parent))
        .await?;

    let moved = store
        .get(node_id)
        .await?
        .ok_or_else(|| NestedSetError::NotFound(format!("{node_id}")))?;

    if !options.skip_hooks {
        hooks.run_after_move(&MoveEvent {
            node: &moved,
            position,
        });
    }

    Ok(MoveOutcome::Moved(moved))
}
