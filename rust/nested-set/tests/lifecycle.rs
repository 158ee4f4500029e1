#![cfg(not(target_arch = "wasm32"))]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::Result;
use nested_set::{
    DestroyOptions, DestroyOutcome, HookDecision, MoveOutcome, MovePosition, NestedSet,
    NestedSetConfig, NestedSetError, RebuildOutcome, Violation,
};
use nested_set_storage::{
    MeasuredNodeStore, MemoryNodeStore, Node, NodeStore, ScopeKey, bounds_of, fixture_node,
    fixture_store,
};
use pretty_assertions::assert_eq;
use tokio::sync::Mutex;

type Tree = NestedSet<MemoryNodeStore<Node<String>>>;

fn id(value: &str) -> String {
    value.to_owned()
}

fn tree(config: NestedSetConfig) -> Tree {
    NestedSet::new(MemoryNodeStore::default(), config)
}

async fn chain(config: NestedSetConfig) -> Result<Tree> {
    let mut tree = tree(config);
    tree.create(Node::new(id("a"))).await?;
    tree.create(Node::new(id("b")).with_parent(id("a"))).await?;
    tree.create(Node::new(id("c")).with_parent(id("b"))).await?;
    Ok(tree)
}

#[test_log::test(tokio::test)]
async fn it_nests_a_chain_of_children() -> Result<()> {
    let tree = chain(NestedSetConfig::new()).await?;

    assert_eq!(bounds_of(tree.store(), &id("a")).await?, (1, 6));
    assert_eq!(bounds_of(tree.store(), &id("b")).await?, (2, 5));
    assert_eq!(bounds_of(tree.store(), &id("c")).await?, (3, 4));
    assert!(tree.valid().await?);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_moves_the_deepest_node_to_root() -> Result<()> {
    let mut tree = chain(NestedSetConfig::new()).await?;

    let outcome = tree.move_to_root(&id("c")).await?;

    let c = outcome.node().cloned().unwrap();
    assert_eq!((c.left, c.right), (Some(1), Some(2)));
    assert_eq!(c.parent_id, None);
    assert_eq!(bounds_of(tree.store(), &id("a")).await?, (3, 6));
    assert_eq!(bounds_of(tree.store(), &id("b")).await?, (4, 5));
    assert!(tree.valid().await?);

    let roots: Vec<String> = tree
        .roots(&ScopeKey::unscoped())
        .await?
        .into_iter()
        .map(|node| node.id)
        .collect();
    assert_eq!(roots, vec![id("c"), id("a")]);
    assert_eq!(
        tree.first_root(&ScopeKey::unscoped()).await?.map(|node| node.id),
        Some(id("c"))
    );

    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_cascades_a_destroy_through_the_subtree() -> Result<()> {
    let mut tree = chain(NestedSetConfig::new()).await?;

    let outcome = tree
        .destroy_with(&id("b"), DestroyOptions { cascade: true })
        .await?;

    assert!(matches!(outcome, DestroyOutcome::Destroyed { removed: 2, .. }));
    assert_eq!(tree.get(&id("b")).await?, None);
    assert_eq!(tree.get(&id("c")).await?, None);
    assert_eq!(bounds_of(tree.store(), &id("a")).await?, (1, 2));
    assert!(tree.valid().await?);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_bulk_deletes_descendants_and_compacts_by_the_width() -> Result<()> {
    let mut tree = chain(NestedSetConfig::new()).await?;
    tree.create(Node::new(id("d")).with_parent(id("a"))).await?;
    tree.create(Node::new(id("e"))).await?;
    // a(1,8) [ b(2,5) [ c(3,4) ], d(6,7) ], e(9,10)

    tree.destroy(&id("b")).await?;

    assert_eq!(tree.get(&id("c")).await?, None);
    assert_eq!(bounds_of(tree.store(), &id("a")).await?, (1, 4));
    assert_eq!(bounds_of(tree.store(), &id("d")).await?, (2, 3));
    assert_eq!(bounds_of(tree.store(), &id("e")).await?, (5, 6));
    assert!(tree.valid().await?);

    assert_eq!(tree.destroy(&id("b")).await?, DestroyOutcome::AlreadyGone);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_follows_the_configured_dependent_behavior() -> Result<()> {
    let config = NestedSetConfig::from_json(r#"{ "dependent": "destroy" }"#)?;
    let mut tree = chain(config).await?;
    let destroyed = Arc::new(AtomicUsize::new(0));
    let counter = destroyed.clone();
    tree.hooks_mut().on_destroy(move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    tree.destroy(&id("a")).await?;

    assert_eq!(destroyed.load(Ordering::Relaxed), 3);
    assert!(tree.store().is_empty().await);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_keeps_scopes_apart() -> Result<()> {
    let mut tree = tree(NestedSetConfig::new().scoped_by(["organization_id"]));
    tree.create(Node::new(id("a")).with_attribute("organization_id", 1i64))
        .await?;
    tree.create(
        Node::new(id("b"))
            .with_parent(id("a"))
            .with_attribute("organization_id", 1i64),
    )
    .await?;
    tree.create(Node::new(id("x")).with_attribute("organization_id", 2i64))
        .await?;

    // Each scope is numbered on its own
    assert_eq!(bounds_of(tree.store(), &id("a")).await?, (1, 4));
    assert_eq!(bounds_of(tree.store(), &id("b")).await?, (2, 3));
    assert_eq!(bounds_of(tree.store(), &id("x")).await?, (1, 2));

    let across = tree.move_to_child_of(&id("x"), &id("a")).await;
    assert!(matches!(across, Err(NestedSetError::ScopeMismatch(_))));

    let misplaced = tree
        .create(
            Node::new(id("y"))
                .with_parent(id("a"))
                .with_attribute("organization_id", 2i64),
        )
        .await;
    assert!(matches!(misplaced, Err(NestedSetError::ScopeMismatch(_))));

    let a = tree.get(&id("a")).await?.unwrap();
    let x = tree.get(&id("x")).await?.unwrap();
    assert!(!tree.same_scope(&a, &x));
    assert!(!tree.is_ancestor_of(&a, &x));
    assert_eq!(
        tree.roots(&ScopeKey::new([("organization_id", 2i64)]))
            .await?
            .len(),
        1
    );

    tree.destroy(&id("a")).await?;
    assert_eq!(bounds_of(tree.store(), &id("x")).await?, (1, 2));
    assert!(tree.valid().await?);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_lets_observers_veto_moves() -> Result<()> {
    let mut tree = chain(NestedSetConfig::new()).await?;
    let moves = Arc::new(AtomicUsize::new(0));
    let counter = moves.clone();
    tree.hooks_mut()
        .before_move(|event| {
            if event.node.id == "b" {
                HookDecision::Veto
            } else {
                HookDecision::Proceed
            }
        })
        .after_move(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

    let vetoed = tree.move_to_root(&id("b")).await?;
    let moved = tree.move_to_root(&id("c")).await?;

    assert_eq!(vetoed, MoveOutcome::Vetoed);
    assert!(moved.is_moved());
    assert_eq!(moves.load(Ordering::Relaxed), 1);
    assert_eq!(bounds_of(tree.store(), &id("b")).await?, (4, 5));

    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_parses_positions_from_tokens() -> Result<()> {
    let mut tree = chain(NestedSetConfig::new()).await?;
    tree.create(Node::new(id("d"))).await?;

    let position = MovePosition::from_token("left", Some(id("a")))?;
    tree.move_to(&id("d"), position).await?;

    assert_eq!(bounds_of(tree.store(), &id("d")).await?, (1, 2));
    assert_eq!(bounds_of(tree.store(), &id("a")).await?, (3, 8));
    assert!(matches!(
        MovePosition::from_token("above", Some(id("a"))),
        Err(NestedSetError::UnknownPosition(_))
    ));

    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_rebuilds_a_corrupted_tree_from_parent_references() -> Result<()> {
    let store = MemoryNodeStore::<Node<String>>::from_json(
        r#"[
            { "id": "a", "lft": 1, "rgt": 8 },
            { "id": "b", "parent_id": "a", "lft": 2, "rgt": 3 },
            { "id": "c", "parent_id": "a", "lft": 2, "rgt": 9 },
            { "id": "d", "parent_id": "c" },
            { "id": "e", "lft": 4, "rgt": 12 }
        ]"#,
    )?;
    let mut tree = NestedSet::new(store, NestedSetConfig::new());

    let report = tree.validate().await?;
    assert!(!report.is_valid());
    assert!(
        report
            .violations
            .contains(&Violation::Unallocated { id: id("d") })
    );

    let outcome = tree.rebuild().await?;

    assert!(matches!(outcome, RebuildOutcome::Rebuilt { .. }));
    assert_eq!(bounds_of(tree.store(), &id("a")).await?, (1, 8));
    assert_eq!(bounds_of(tree.store(), &id("b")).await?, (2, 3));
    assert_eq!(bounds_of(tree.store(), &id("c")).await?, (4, 7));
    assert_eq!(bounds_of(tree.store(), &id("d")).await?, (5, 6));
    assert_eq!(bounds_of(tree.store(), &id("e")).await?, (9, 10));
    assert!(tree.valid().await?);
    assert_eq!(tree.rebuild().await?, RebuildOutcome::AlreadyValid);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_repairs_only_the_damaged_scope() -> Result<()> {
    let store = fixture_store([
        fixture_node("a", None, 1, 2).with_attribute("organization_id", 1i64),
        fixture_node("b", None, 5, 6).with_attribute("organization_id", 1i64),
        fixture_node("x", None, 3, 3).with_attribute("organization_id", 2i64),
        fixture_node("y", Some("x"), 8, 4).with_attribute("organization_id", 2i64),
    ]);
    let mut tree = NestedSet::new(store, NestedSetConfig::new().scoped_by(["organization_id"]));
    let intact = ScopeKey::new([("organization_id", 1i64)]);
    let damaged = ScopeKey::new([("organization_id", 2i64)]);

    assert!(tree.validate_scope(&intact).await?.is_valid());
    assert!(!tree.validate_scope(&damaged).await?.is_valid());
    assert_eq!(
        tree.rebuild_scope(&intact).await?,
        RebuildOutcome::AlreadyValid
    );

    let outcome = tree.rebuild_scope(&damaged).await?;

    assert_eq!(outcome, RebuildOutcome::Rebuilt { updated: 2 });
    assert_eq!(bounds_of(tree.store(), &id("x")).await?, (1, 4));
    assert_eq!(bounds_of(tree.store(), &id("y")).await?, (2, 3));
    assert_eq!(bounds_of(tree.store(), &id("b")).await?, (5, 6));
    assert!(tree.valid().await?);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_only_touches_the_swapped_ranges() -> Result<()> {
    let store = MeasuredNodeStore::new(fixture_store([
        fixture_node("a", None, 1, 12),
        fixture_node("b", Some("a"), 2, 3),
        fixture_node("c", Some("a"), 4, 5),
        fixture_node("d", Some("a"), 6, 7),
        fixture_node("e", Some("a"), 8, 9),
        fixture_node("f", Some("a"), 10, 11),
        fixture_node("x", None, 13, 14),
    ]));
    let mut tree = NestedSet::new(store, NestedSetConfig::new());
    tree.store().reset();

    tree.move_to_right_of(&id("c"), &id("d")).await?;

    // Two lefts, two rights and a parent reference
    assert_eq!(tree.store().writes(), 5);
    assert_eq!(bounds_of(tree.store(), &id("d")).await?, (4, 5));
    assert_eq!(bounds_of(tree.store(), &id("c")).await?, (6, 7));
    assert!(tree.valid().await?);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_shares_a_store_behind_a_mutex() -> Result<()> {
    let store = Arc::new(Mutex::new(MemoryNodeStore::<Node<String>>::default()));
    let mut tree = NestedSet::new(store.clone(), NestedSetConfig::new());

    tree.create(Node::new(id("a"))).await?;
    tree.create(Node::new(id("b")).with_parent(id("a"))).await?;

    assert_eq!(
        store.get(&id("a")).await?.and_then(|node| node.right),
        Some(4)
    );

    Ok(())
}

#[test_log::test(tokio::test)]
async fn it_reads_the_tree_back() -> Result<()> {
    let mut tree = chain(NestedSetConfig::new()).await?;
    tree.create(Node::new(id("d")).with_parent(id("a"))).await?;

    let a = tree.get(&id("a")).await?.unwrap();
    let c = tree.get(&id("c")).await?.unwrap();
    let d = tree.get(&id("d")).await?.unwrap();

    let ids = |nodes: Vec<Node<String>>| nodes.into_iter().map(|node| node.id).collect::<Vec<_>>();

    assert_eq!(ids(tree.descendants(&a).await?), vec![id("b"), id("c"), id("d")]);
    assert_eq!(ids(tree.self_and_ancestors(&c).await?), vec![id("a"), id("b"), id("c")]);
    assert_eq!(ids(tree.siblings(&d).await?), vec![id("b")]);
    assert_eq!(tree.level(&c).await?, 2);
    assert_eq!(tree.root(&c).await?.map(|node| node.id), Some(id("a")));
    assert!(tree.is_descendant_of(&c, &a));
    assert!(tree.is_or_is_ancestor_of(&a, &a));
    assert_eq!(
        tree.to_text(&a).await?,
        "* a (-, 1, 8)\n** b (a, 2, 5)\n*** c (b, 3, 4)\n** d (a, 6, 7)"
    );

    Ok(())
}
