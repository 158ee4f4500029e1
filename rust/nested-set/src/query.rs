//! Read-side queries that exploit the boundary encoding.
//!
//! Every query runs against the boundaries of the node as passed in. Reload a
//! node from the store first if it may have been moved since it was read.

use nested_set_storage::{
    Direction, Field, NestedSetNode, NodeFilter, NodeQuery, Operator, ScopeKey,
};

use crate::{Interval, NestedSetConfig, NestedSetError, TreeStore};

fn by_left<Id>(filter: NodeFilter<Id>) -> NodeQuery<Id>
where
    Id: Ord,
{
    NodeQuery::from(filter).order_by(Field::Left, Direction::Ascending)
}

fn without_self<Record>(node: &Record, set: Vec<Record>) -> Vec<Record>
where
    Record: NestedSetNode,
{
    set.into_iter()
        .filter(|other| other.id() != node.id())
        .collect()
}

/// `node` and every node whose interval encloses it, outermost first
pub async fn self_and_ancestors<Store>(
    store: &Store,
    config: &NestedSetConfig,
    node: &Store::Record,
) -> Result<Vec<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    let interval = Interval::of(node)?;
    let query = by_left(
        config
            .filter_for(node)
            .left(Operator::Le, interval.left)
            .right(Operator::Ge, interval.right),
    );
    Ok(store.find(&query).await?)
}

/// Every node whose interval encloses `node`, outermost first
pub async fn ancestors<Store>(
    store: &Store,
    config: &NestedSetConfig,
    node: &Store::Record,
) -> Result<Vec<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    Ok(without_self(
        node,
        self_and_ancestors(store, config, node).await?,
    ))
}

/// `node` and its whole subtree, in preorder
pub async fn self_and_descendants<Store>(
    store: &Store,
    config: &NestedSetConfig,
    node: &Store::Record,
) -> Result<Vec<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    let interval = Interval::of(node)?;
    let query = by_left(
        config
            .filter_for(node)
            .left(Operator::Ge, interval.left)
            .right(Operator::Le, interval.right),
    );
    Ok(store.find(&query).await?)
}

/// The subtree of `node` without `node` itself, in preorder
pub async fn descendants<Store>(
    store: &Store,
    config: &NestedSetConfig,
    node: &Store::Record,
) -> Result<Vec<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    Ok(without_self(
        node,
        self_and_descendants(store, config, node).await?,
    ))
}

/// Every node that shares `node`'s parent reference, `node` included
pub async fn self_and_siblings<Store>(
    store: &Store,
    config: &NestedSetConfig,
    node: &Store::Record,
) -> Result<Vec<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    let query = by_left(config.filter_for(node).parent(node.parent_id().cloned()));
    Ok(store.find(&query).await?)
}

/// Every node that shares `node`'s parent reference, `node` excluded
pub async fn siblings<Store>(
    store: &Store,
    config: &NestedSetConfig,
    node: &Store::Record,
) -> Result<Vec<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    Ok(without_self(
        node,
        self_and_siblings(store, config, node).await?,
    ))
}

/// The direct children of `node`, ordered by left boundary
pub async fn children<Store>(
    store: &Store,
    config: &NestedSetConfig,
    node: &Store::Record,
) -> Result<Vec<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    let query = by_left(config.filter_for(node).parent(Some(node.id().clone())));
    Ok(store.find(&query).await?)
}

/// The outermost parentless node enclosing `node` (possibly `node` itself)
pub async fn root<Store>(
    store: &Store,
    config: &NestedSetConfig,
    node: &Store::Record,
) -> Result<Option<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    let interval = Interval::of(node)?;
    let query = by_left(
        config
            .filter_for(node)
            .parent(None)
            .left(Operator::Le, interval.left)
            .right(Operator::Ge, interval.right),
    )
    .limit(1);
    Ok(store.find(&query).await?.into_iter().next())
}

/// Every root node of `scope`, ordered by left boundary
pub async fn roots<Store>(
    store: &Store,
    scope: &ScopeKey,
) -> Result<Vec<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    let query = by_left(NodeFilter::in_scope(scope.clone()).parent(None));
    Ok(store.find(&query).await?)
}

/// The root node of `scope` with the smallest left boundary
pub async fn first_root<Store>(
    store: &Store,
    scope: &ScopeKey,
) -> Result<Option<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    let query = by_left(NodeFilter::in_scope(scope.clone()).parent(None)).limit(1);
    Ok(store.find(&query).await?.into_iter().next())
}

/// The depth of `node`: 0 for a root, otherwise its number of ancestors
pub async fn level<Store>(
    store: &Store,
    config: &NestedSetConfig,
    node: &Store::Record,
) -> Result<usize, NestedSetError>
where
    Store: TreeStore,
{
    if node.parent_id().is_none() {
        return Ok(0);
    }
    Ok(ancestors(store, config, node).await?.len())
}

/// The nearest sibling to the left of `node`
pub async fn left_sibling<Store>(
    store: &Store,
    config: &NestedSetConfig,
    node: &Store::Record,
) -> Result<Option<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    let interval = Interval::of(node)?;
    let query = NodeQuery::from(
        config
            .filter_for(node)
            .parent(node.parent_id().cloned())
            .left(Operator::Lt, interval.left),
    )
    .order_by(Field::Left, Direction::Descending)
    .limit(1);
    Ok(store.find(&query).await?.into_iter().next())
}

/// The nearest sibling to the right of `node`
pub async fn right_sibling<Store>(
    store: &Store,
    config: &NestedSetConfig,
    node: &Store::Record,
) -> Result<Option<Store::Record>, NestedSetError>
where
    Store: TreeStore,
{
    let interval = Interval::of(node)?;
    let query = by_left(
        config
            .filter_for(node)
            .parent(node.parent_id().cloned())
            .left(Operator::Gt, interval.right),
    )
    .limit(1);
    Ok(store.find(&query).await?.into_iter().next())
}

fn intervals<A, B>(a: &A, b: &B) -> Option<(Interval, Interval)>
where
    A: NestedSetNode + ?Sized,
    B: NestedSetNode + ?Sized,
{
    Some((Interval::of(a).ok()?, Interval::of(b).ok()?))
}

/// True if `node` lies strictly inside `other`'s interval
pub fn is_descendant_of<A, B>(config: &NestedSetConfig, node: &A, other: &B) -> bool
where
    A: NestedSetNode + ?Sized,
    B: NestedSetNode + ?Sized,
{
    intervals(node, other).is_some_and(|(node, other)| {
        other.left < node.left && node.left < other.right
    }) && config.same_scope(node, other)
}

/// True if `node` is `other` or lies inside `other`'s interval
pub fn is_or_is_descendant_of<A, B>(config: &NestedSetConfig, node: &A, other: &B) -> bool
where
    A: NestedSetNode + ?Sized,
    B: NestedSetNode + ?Sized,
{
    intervals(node, other).is_some_and(|(node, other)| {
        other.left <= node.left && node.left < other.right
    }) && config.same_scope(node, other)
}

/// True if `other` lies strictly inside `node`'s interval
pub fn is_ancestor_of<A, B>(config: &NestedSetConfig, node: &A, other: &B) -> bool
where
    A: NestedSetNode + ?Sized,
    B: NestedSetNode + ?Sized,
{
    intervals(node, other).is_some_and(|(node, other)| {
        node.left < other.left && other.left < node.right
    }) && config.same_scope(node, other)
}

/// True if `other` is `node` or lies inside `node`'s interval
pub fn is_or_is_ancestor_of<A, B>(config: &NestedSetConfig, node: &A, other: &B) -> bool
where
    A: NestedSetNode + ?Sized,
    B: NestedSetNode + ?Sized,
{
    intervals(node, other).is_some_and(|(node, other)| {
        node.left <= other.left && other.left < node.right
    }) && config.same_scope(node, other)
}

/// True if `node` has no parent
pub fn is_root<Node>(node: &Node) -> bool
where
    Node: NestedSetNode + ?Sized,
{
    node.parent_id().is_none()
}

/// True if `node` has a parent
pub fn is_child<Node>(node: &Node) -> bool
where
    Node: NestedSetNode + ?Sized,
{
    node.parent_id().is_some()
}

/// True if `node` has allocated boundaries and nothing nested inside them
pub fn is_leaf<Node>(node: &Node) -> bool
where
    Node: NestedSetNode + ?Sized,
{
    Interval::of(node).is_ok_and(|interval| interval.is_leaf())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use nested_set_storage::{MemoryNodeStore, Node, NodeStore, ScopeKey, fixture_node, fixture_store};
    use pretty_assertions::assert_eq;

    use crate::{
        NestedSetConfig, ancestors, children, descendants, first_root, is_ancestor_of,
        is_child, is_descendant_of, is_leaf, is_or_is_ancestor_of, is_or_is_descendant_of,
        is_root, left_sibling, level, right_sibling, root, roots, self_and_ancestors,
        self_and_descendants, self_and_siblings, siblings,
    };

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    use wasm_bindgen_test::wasm_bindgen_test;

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_dedicated_worker);

    // a(1,14)
    //   b(2,7)
    //     c(3,4)
    //     d(5,6)
    //   e(8,13)
    //     f(9,12)
    //       g(10,11)
    // h(15,16)
    fn forest() -> MemoryNodeStore<Node<String>> {
        fixture_store([
            fixture_node("a", None, 1, 14),
            fixture_node("b", Some("a"), 2, 7),
            fixture_node("c", Some("b"), 3, 4),
            fixture_node("d", Some("b"), 5, 6),
            fixture_node("e", Some("a"), 8, 13),
            fixture_node("f", Some("e"), 9, 12),
            fixture_node("g", Some("f"), 10, 11),
            fixture_node("h", None, 15, 16),
        ])
    }

    fn ids(nodes: Vec<Node<String>>) -> Vec<String> {
        nodes.into_iter().map(|node| node.id).collect()
    }

    async fn load(store: &MemoryNodeStore<Node<String>>, id: &str) -> Result<Node<String>> {
        store
            .get(&id.to_owned())
            .await?
            .ok_or_else(|| anyhow::anyhow!("missing {id}"))
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_finds_ancestors_outermost_first() -> Result<()> {
        let store = forest();
        let config = NestedSetConfig::new();
        let g = load(&store, "g").await?;

        assert_eq!(
            ids(self_and_ancestors(&store, &config, &g).await?),
            vec!["a", "e", "f", "g"]
        );
        assert_eq!(ids(ancestors(&store, &config, &g).await?), vec!["a", "e", "f"]);

        Ok(())
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_finds_descendants_in_preorder() -> Result<()> {
        let store = forest();
        let config = NestedSetConfig::new();
        let a = load(&store, "a").await?;
        let c = load(&store, "c").await?;

        assert_eq!(
            ids(self_and_descendants(&store, &config, &a).await?),
            vec!["a", "b", "c", "d", "e", "f", "g"]
        );
        assert_eq!(ids(self_and_descendants(&store, &config, &c).await?), vec!["c"]);
        assert!(descendants(&store, &config, &c).await?.is_empty());

        Ok(())
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_finds_siblings_and_children() -> Result<()> {
        let store = forest();
        let config = NestedSetConfig::new();
        let b = load(&store, "b").await?;
        let a = load(&store, "a").await?;

        assert_eq!(ids(self_and_siblings(&store, &config, &b).await?), vec!["b", "e"]);
        assert_eq!(ids(siblings(&store, &config, &b).await?), vec!["e"]);
        assert_eq!(ids(siblings(&store, &config, &a).await?), vec!["h"]);
        assert_eq!(ids(children(&store, &config, &a).await?), vec!["b", "e"]);

        Ok(())
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_finds_the_nearest_sibling_on_each_side() -> Result<()> {
        let store = forest();
        let config = NestedSetConfig::new();
        let b = load(&store, "b").await?;
        let e = load(&store, "e").await?;

        assert_eq!(left_sibling(&store, &config, &b).await?, None);
        assert_eq!(
            right_sibling(&store, &config, &b).await?.map(|node| node.id),
            Some("e".to_owned())
        );
        assert_eq!(
            left_sibling(&store, &config, &e).await?.map(|node| node.id),
            Some("b".to_owned())
        );
        assert_eq!(right_sibling(&store, &config, &e).await?, None);

        Ok(())
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_finds_roots_and_levels() -> Result<()> {
        let store = forest();
        let config = NestedSetConfig::new();
        let g = load(&store, "g").await?;
        let h = load(&store, "h").await?;

        assert_eq!(
            root(&store, &config, &g).await?.map(|node| node.id),
            Some("a".to_owned())
        );
        assert_eq!(
            root(&store, &config, &h).await?.map(|node| node.id),
            Some("h".to_owned())
        );
        assert_eq!(ids(roots(&store, &ScopeKey::unscoped()).await?), vec!["a", "h"]);
        assert_eq!(
            first_root(&store, &ScopeKey::unscoped()).await?.map(|node| node.id),
            Some("a".to_owned())
        );
        assert_eq!(level(&store, &config, &g).await?, 3);
        assert_eq!(level(&store, &config, &h).await?, 0);

        Ok(())
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_keeps_scopes_apart() -> Result<()> {
        let store = fixture_store([
            fixture_node("a", None, 1, 4).with_attribute("organization_id", "acme"),
            fixture_node("b", Some("a"), 2, 3).with_attribute("organization_id", "acme"),
            fixture_node("x", None, 1, 4).with_attribute("organization_id", "globex"),
            fixture_node("y", Some("x"), 2, 3).with_attribute("organization_id", "globex"),
        ]);
        let config = NestedSetConfig::new().scoped_by(["organization_id"]);
        let a = load(&store, "a").await?;
        let b = load(&store, "b").await?;
        let y = load(&store, "y").await?;

        assert_eq!(ids(self_and_descendants(&store, &config, &a).await?), vec!["a", "b"]);
        assert_eq!(ids(ancestors(&store, &config, &y).await?), vec!["x"]);
        assert!(is_descendant_of(&config, &b, &a));
        assert!(!is_descendant_of(&config, &y, &a));

        Ok(())
    }

    #[test]
    fn it_distinguishes_strict_and_inclusive_containment() {
        let config = NestedSetConfig::new();
        let a = fixture_node("a", None, 1, 6);
        let b = fixture_node("b", Some("a"), 2, 5);

        assert!(is_descendant_of(&config, &b, &a));
        assert!(!is_descendant_of(&config, &a, &a));
        assert!(is_or_is_descendant_of(&config, &a, &a));
        assert!(is_ancestor_of(&config, &a, &b));
        assert!(!is_ancestor_of(&config, &b, &a));
        assert!(is_or_is_ancestor_of(&config, &b, &b));
    }

    #[test]
    fn it_classifies_roots_children_and_leaves() {
        let a = fixture_node("a", None, 1, 4);
        let b = fixture_node("b", Some("a"), 2, 3);

        assert!(is_root(&a) && !is_child(&a));
        assert!(is_child(&b) && !is_root(&b));
        assert!(is_leaf(&b));
        assert!(!is_leaf(&a));
        assert!(!is_leaf(&Node::new("new".to_owned())));
    }
}
