use anyhow::{Result, anyhow};

use crate::{MemoryNodeStore, NestedSetNode, NestedSetStoreError, Node, NodeStore};

/// Build a fixture [Node] keyed by a short textual id
pub fn fixture_node(id: &str, parent_id: Option<&str>, left: i64, right: i64) -> Node<String> {
    let node = Node::new(id.to_owned()).with_bounds(left, right);
    match parent_id {
        Some(parent_id) => node.with_parent(parent_id.to_owned()),
        None => node,
    }
}

/// A [MemoryNodeStore] holding the given fixture records verbatim
pub fn fixture_store<I>(records: I) -> MemoryNodeStore<Node<String>>
where
    I: IntoIterator<Item = Node<String>>,
{
    MemoryNodeStore::from_records(records)
}

/// Read back the `(left, right)` boundaries of a stored record, for use in
/// assertions
pub async fn bounds_of<Store>(store: &Store, id: &Store::Id) -> Result<(i64, i64)>
where
    Store: NodeStore,
{
    let record = store
        .get(id)
        .await
        .map_err(|error| anyhow!(Into::<NestedSetStoreError>::into(error)))?
        .ok_or_else(|| anyhow!("No record for {id}"))?;

    match (record.left(), record.right()) {
        (Some(left), Some(right)) => Ok((left, right)),
        _ => Err(anyhow!("Record {id} has unallocated boundaries")),
    }
}
