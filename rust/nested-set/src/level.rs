use nested_set_storage::NestedSetNode;

use crate::{Interval, NestedSetConfig, NestedSetError, TreeStore, level, self_and_descendants};

/// Pairs each node of a left-ordered sequence with its depth, in one pass and
/// without touching the store.
///
/// The walk keeps the chain of parent ids leading to the current node. When
/// a node's parent differs from the top of that chain, the walk has either
/// descended (the parent is new, so it is pushed) or climbed back out (the
/// parent is already on the chain, so everything above it is popped). The
/// depth is the length of the chain minus one.
///
/// Input must be sorted by ascending left boundary; any other order yields
/// meaningless depths. Depths are relative to the chain the walk starts
/// with: a sequence that begins below the root reports its first node at
/// depth 1.
pub struct LevelWalk<Nodes, Node>
where
    Node: NestedSetNode,
{
    nodes: Nodes,
    path: Vec<Option<Node::Id>>,
}

impl<'a, Nodes, Node> Iterator for LevelWalk<Nodes, Node>
where
    Nodes: Iterator<Item = &'a Node>,
    Node: NestedSetNode + 'a,
{
    type Item = (&'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.next()?;
        let parent_id = node.parent_id();

        if self.path.last().map(Option::as_ref) != Some(parent_id) {
            if self.path.iter().any(|id| id.as_ref() == parent_id) {
                while self.path.last().map(Option::as_ref) != Some(parent_id) {
                    self.path.pop();
                }
            } else {
                self.path.push(parent_id.cloned());
            }
        }

        Some((node, self.path.len() - 1))
    }
}

/// Walk `nodes` (sorted by left boundary), yielding each with its depth
pub fn level_walk<'a, Nodes, Node>(
    nodes: Nodes,
) -> LevelWalk<Nodes::IntoIter, Node>
where
    Nodes: IntoIterator<Item = &'a Node>,
    Node: NestedSetNode + 'a,
{
    LevelWalk {
        nodes: nodes.into_iter(),
        path: vec![None],
    }
}

/// Render `node` and its subtree as an indented outline, one line per node:
/// `*` repeated (depth + 1) times, then the id, parent, left and right.
pub async fn to_text<Store>(
    store: &Store,
    config: &NestedSetConfig,
    node: &Store::Record,
) -> Result<String, NestedSetError>
where
    Store: TreeStore,
{
    let subtree = self_and_descendants(store, config, node).await?;
    let depth = level(store, config, node).await?;
    let offset = if node.parent_id().is_some() {
        depth.saturating_sub(1)
    } else {
        depth
    };

    let mut text = String::new();
    for (member, relative) in level_walk(&subtree) {
        let interval = Interval::of(member)?;
        let parent = member
            .parent_id()
            .map(|id| format!("{id}"))
            .unwrap_or_else(|| "-".to_owned());
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&format!(
            "{} {} ({}, {}, {})",
            "*".repeat(relative + offset + 1),
            member.id(),
            parent,
            interval.left,
            interval.right
        ));
    }

    Ok(text)
}
