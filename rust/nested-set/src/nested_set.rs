use nested_set_storage::{FieldUpdate, NestedSetNode, NestedSetRecord, ScopeKey};

use crate::{
    DestroyOptions, DestroyOutcome, MoveOptions, MoveOutcome, MovePosition, NestedSetConfig,
    NestedSetError, RebuildOutcome, TreeHooks, TreeStore, ValidationReport, allocate,
};

/// Per-call switches for [NestedSet::save].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Persist a changed parent reference as is, without moving the node.
    /// The tree is left inconsistent until the caller moves the node or
    /// runs [NestedSet::rebuild].
    pub skip_hooks: bool,
}

/// A nested set tree kept in a [TreeStore].
///
/// This bundles a store, a [NestedSetConfig] and a set of [TreeHooks] so that
/// callers do not have to thread them through every call. All structural
/// changes go through here (or through the free functions it delegates to);
/// writing boundaries directly to the store bypasses every guarantee.
///
/// ```
/// # use nested_set::{NestedSet, NestedSetConfig};
/// # use nested_set_storage::{MemoryNodeStore, Node};
/// # tokio_test::block_on(async {
/// let mut tree = NestedSet::new(MemoryNodeStore::default(), NestedSetConfig::new());
///
/// tree.create(Node::new(1u64)).await?;
/// tree.create(Node::new(2u64).with_parent(1)).await?;
/// let leaf = tree.create(Node::new(3u64).with_parent(2)).await?;
///
/// assert_eq!((leaf.left, leaf.right), (Some(3), Some(4)));
/// assert_eq!(tree.ancestors(&leaf).await?.len(), 2);
/// # Ok::<_, nested_set::NestedSetError>(())
/// # }).unwrap();
/// ```
pub struct NestedSet<Store>
where
    Store: TreeStore,
{
    store: Store,
    config: NestedSetConfig,
    hooks: TreeHooks<Store::Record>,
}

impl<Store> NestedSet<Store>
where
    Store: TreeStore,
{
    /// Maintain the tree held in `store`
    pub fn new(store: Store, config: NestedSetConfig) -> Self {
        Self {
            store,
            config,
            hooks: TreeHooks::default(),
        }
    }

    /// The backing store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The configuration every operation runs with
    pub fn config(&self) -> &NestedSetConfig {
        &self.config
    }

    /// Register move and destroy observers
    pub fn hooks_mut(&mut self) -> &mut TreeHooks<Store::Record> {
        &mut self.hooks
    }

    /// Give the backing store back
    pub fn into_store(self) -> Store {
        self.store
    }

    /// Look up a node by id
    pub async fn get(&self, id: &Store::Id) -> Result<Option<Store::Record>, NestedSetError> {
        Ok(self.store.get(id).await?)
    }

    async fn reload(&self, id: &Store::Id) -> Result<Store::Record, NestedSetError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| NestedSetError::NotFound(format!("{id}")))
    }

    /// Insert a new node.
    ///
    /// The node is given boundaries after everything else in its scope. If it
    /// names a parent it is then moved to become that parent's last child.
    /// Move observers are not told about that placement. Returns the node as
    /// stored.
    pub async fn create(
        &mut self,
        mut record: Store::Record,
    ) -> Result<Store::Record, NestedSetError> {
        let parent_id = record.parent_id().cloned();

        if let Some(parent_id) = parent_id.as_ref() {
            let parent = self.reload(parent_id).await?;
            if !self.config.same_scope(&record, &parent) {
                return Err(NestedSetError::ScopeMismatch(format!(
                    "{} cannot be created under {parent_id}",
                    record.id()
                )));
            }
        }

        let interval = allocate(&self.store, &self.config.scope_of(&record)).await?;
        record.apply(FieldUpdate::Left(interval.left));
        record.apply(FieldUpdate::Right(interval.right));

        let id = record.id().clone();
        self.store.put(record).await?;

        if let Some(parent_id) = parent_id {
            crate::move_node(
                &mut self.store,
                &self.config,
                &self.hooks,
                &id,
                &MovePosition::ChildOf(parent_id),
                MoveOptions { skip_hooks: true },
            )
            .await?;
        }

        self.reload(&id).await
    }

    /// Write `record`, creating it if it is not stored yet.
    ///
    /// Boundaries on the incoming record are ignored; the stored ones are
    /// kept. If the parent reference differs from the stored one the node is
    /// moved: to the root when the parent was cleared, otherwise to become
    /// the last child of the new parent. Returns the node as stored.
    pub async fn save(
        &mut self,
        mut record: Store::Record,
        options: SaveOptions,
    ) -> Result<Store::Record, NestedSetError> {
        let Some(stored) = self.store.get(record.id()).await? else {
            return self.create(record).await;
        };

        if let Some(left) = stored.left() {
            record.apply(FieldUpdate::Left(left));
        }
        if let Some(right) = stored.right() {
            record.apply(FieldUpdate::Right(right));
        }

        let id = record.id().clone();
        let new_parent = record.parent_id().cloned();
        let parent_changed = stored.parent_id() != new_parent.as_ref();

        if !parent_changed || options.skip_hooks {
            self.store.put(record).await?;
            return self.reload(&id).await;
        }

        record.apply(FieldUpdate::Parent(stored.parent_id().cloned()));
        self.store.put(record).await?;

        let position = match new_parent {
            Some(parent_id) => MovePosition::ChildOf(parent_id),
            None => MovePosition::Root,
        };
        tracing::debug!(node = %id, "Parent changed on save");
        self.move_to(&id, position).await?;

        self.reload(&id).await
    }

    /// Move a node (and its subtree) to `position`, notifying observers
    pub async fn move_to(
        &mut self,
        id: &Store::Id,
        position: MovePosition<Store::Id>,
    ) -> Result<MoveOutcome<Store::Record>, NestedSetError> {
        self.move_to_with(id, position, MoveOptions::default())
            .await
    }

    /// Move a node (and its subtree) to `position`
    pub async fn move_to_with(
        &mut self,
        id: &Store::Id,
        position: MovePosition<Store::Id>,
        options: MoveOptions,
    ) -> Result<MoveOutcome<Store::Record>, NestedSetError> {
        crate::move_node(
            &mut self.store,
            &self.config,
            &self.hooks,
            id,
            &position,
            options,
        )
        .await
    }

    /// Make a node the left sibling of `target`
    pub async fn move_to_left_of(
        &mut self,
        id: &Store::Id,
        target: &Store::Id,
    ) -> Result<MoveOutcome<Store::Record>, NestedSetError> {
        self.move_to(id, MovePosition::LeftOf(target.clone())).await
    }

    /// Make a node the right sibling of `target`
    pub async fn move_to_right_of(
        &mut self,
        id: &Store::Id,
        target: &Store::Id,
    ) -> Result<MoveOutcome<Store::Record>, NestedSetError> {
        self.move_to(id, MovePosition::RightOf(target.clone())).await
    }

    /// Make a node the last child of `target`
    pub async fn move_to_child_of(
        &mut self,
        id: &Store::Id,
        target: &Store::Id,
    ) -> Result<MoveOutcome<Store::Record>, NestedSetError> {
        self.move_to(id, MovePosition::ChildOf(target.clone())).await
    }

    /// Make a node a root of its scope
    pub async fn move_to_root(
        &mut self,
        id: &Store::Id,
    ) -> Result<MoveOutcome<Store::Record>, NestedSetError> {
        self.move_to(id, MovePosition::Root).await
    }

    /// Swap a node with its nearest left sibling. Nothing happens if it has
    /// none.
    pub async fn move_left(
        &mut self,
        id: &Store::Id,
    ) -> Result<MoveOutcome<Store::Record>, NestedSetError> {
        let node = self.reload(id).await?;
        match crate::left_sibling(&self.store, &self.config, &node).await? {
            Some(sibling) => self.move_to_left_of(id, sibling.id()).await,
            None => Ok(MoveOutcome::Unchanged(node)),
        }
    }

    /// Swap a node with its nearest right sibling. Nothing happens if it has
    /// none.
    pub async fn move_right(
        &mut self,
        id: &Store::Id,
    ) -> Result<MoveOutcome<Store::Record>, NestedSetError> {
        let node = self.reload(id).await?;
        match crate::right_sibling(&self.store, &self.config, &node).await? {
            Some(sibling) => self.move_to_right_of(id, sibling.id()).await,
            None => Ok(MoveOutcome::Unchanged(node)),
        }
    }

    /// True if the node could be moved next to or under `target`, judged on
    /// their stored state
    pub async fn move_possible(
        &self,
        id: &Store::Id,
        target: &Store::Id,
    ) -> Result<bool, NestedSetError> {
        let node = self.reload(id).await?;
        let target = self.reload(target).await?;
        Ok(crate::move_possible(&self.config, &node, &target))
    }

    /// Destroy a node and its subtree, treating descendants as configured by
    /// [NestedSetConfig::dependent]
    pub async fn destroy(
        &mut self,
        id: &Store::Id,
    ) -> Result<DestroyOutcome<Store::Record>, NestedSetError> {
        let options = DestroyOptions::from(&self.config);
        self.destroy_with(id, options).await
    }

    /// Destroy a node and its subtree
    pub async fn destroy_with(
        &mut self,
        id: &Store::Id,
        options: DestroyOptions,
    ) -> Result<DestroyOutcome<Store::Record>, NestedSetError> {
        crate::destroy(&mut self.store, &self.config, &self.hooks, id, options).await
    }

    /// True if every scope of the tree is consistent
    pub async fn valid(&self) -> Result<bool, NestedSetError> {
        crate::valid(&self.store, &self.config).await
    }

    /// Every structural problem in the tree
    pub async fn validate(&self) -> Result<ValidationReport<Store::Id>, NestedSetError> {
        crate::validate(&self.store, &self.config).await
    }

    /// Every structural problem in one scope
    pub async fn validate_scope(
        &self,
        scope: &ScopeKey,
    ) -> Result<ValidationReport<Store::Id>, NestedSetError> {
        crate::validate_scope(&self.store, scope).await
    }

    /// Renumber every inconsistent scope from its parent references
    pub async fn rebuild(&mut self) -> Result<RebuildOutcome, NestedSetError> {
        crate::rebuild(&mut self.store, &self.config).await
    }

    /// Renumber one scope from its parent references if it is inconsistent
    pub async fn rebuild_scope(
        &mut self,
        scope: &ScopeKey,
    ) -> Result<RebuildOutcome, NestedSetError> {
        crate::rebuild_scope(&mut self.store, scope).await
    }

    /// See [crate::self_and_ancestors]
    pub async fn self_and_ancestors(
        &self,
        node: &Store::Record,
    ) -> Result<Vec<Store::Record>, NestedSetError> {
        crate::self_and_ancestors(&self.store, &self.config, node).await
    }

    /// See [crate::ancestors]
    pub async fn ancestors(
        &self,
        node: &Store::Record,
    ) -> Result<Vec<Store::Record>, NestedSetError> {
        crate::ancestors(&self.store, &self.config, node).await
    }

    /// See [crate::self_and_descendants]
    pub async fn self_and_descendants(
        &self,
        node: &Store::Record,
    ) -> Result<Vec<Store::Record>, NestedSetError> {
        crate::self_and_descendants(&self.store, &self.config, node).await
    }

    /// See [crate::descendants]
    pub async fn descendants(
        &self,
        node: &Store::Record,
    ) -> Result<Vec<Store::Record>, NestedSetError> {
        crate::descendants(&self.store, &self.config, node).await
    }

    /// See [crate::self_and_siblings]
    pub async fn self_and_siblings(
        &self,
        node: &Store::Record,
    ) -> Result<Vec<Store::Record>, NestedSetError> {
        crate::self_and_siblings(&self.store, &self.config, node).await
    }

    /// See [crate::siblings]
    pub async fn siblings(
        &self,
        node: &Store::Record,
    ) -> Result<Vec<Store::Record>, NestedSetError> {
        crate::siblings(&self.store, &self.config, node).await
    }

    /// See [crate::children]
    pub async fn children(
        &self,
        node: &Store::Record,
    ) -> Result<Vec<Store::Record>, NestedSetError> {
        crate::children(&self.store, &self.config, node).await
    }

    /// See [crate::root]
    pub async fn root(
        &self,
        node: &Store::Record,
    ) -> Result<Option<Store::Record>, NestedSetError> {
        crate::root(&self.store, &self.config, node).await
    }

    /// See [crate::level]
    pub async fn level(&self, node: &Store::Record) -> Result<usize, NestedSetError> {
        crate::level(&self.store, &self.config, node).await
    }

    /// See [crate::left_sibling]
    pub async fn left_sibling(
        &self,
        node: &Store::Record,
    ) -> Result<Option<Store::Record>, NestedSetError> {
        crate::left_sibling(&self.store, &self.config, node).await
    }

    /// See [crate::right_sibling]
    pub async fn right_sibling(
        &self,
        node: &Store::Record,
    ) -> Result<Option<Store::Record>, NestedSetError> {
        crate::right_sibling(&self.store, &self.config, node).await
    }

    /// See [crate::roots]
    pub async fn roots(&self, scope: &ScopeKey) -> Result<Vec<Store::Record>, NestedSetError> {
        crate::roots(&self.store, scope).await
    }

    /// See [crate::first_root]
    pub async fn first_root(
        &self,
        scope: &ScopeKey,
    ) -> Result<Option<Store::Record>, NestedSetError> {
        crate::first_root(&self.store, scope).await
    }

    /// See [crate::is_descendant_of]
    pub fn is_descendant_of(&self, node: &Store::Record, other: &Store::Record) -> bool {
        crate::is_descendant_of(&self.config, node, other)
    }

    /// See [crate::is_or_is_descendant_of]
    pub fn is_or_is_descendant_of(&self, node: &Store::Record, other: &Store::Record) -> bool {
        crate::is_or_is_descendant_of(&self.config, node, other)
    }

    /// See [crate::is_ancestor_of]
    pub fn is_ancestor_of(&self, node: &Store::Record, other: &Store::Record) -> bool {
        crate::is_ancestor_of(&self.config, node, other)
    }

    /// See [crate::is_or_is_ancestor_of]
    pub fn is_or_is_ancestor_of(&self, node: &Store::Record, other: &Store::Record) -> bool {
        crate::is_or_is_ancestor_of(&self.config, node, other)
    }

    /// True if both nodes belong to the same scope
    pub fn same_scope(&self, node: &Store::Record, other: &Store::Record) -> bool {
        self.config.same_scope(node, other)
    }

    /// See [crate::to_text]
    pub async fn to_text(&self, node: &Store::Record) -> Result<String, NestedSetError> {
        crate::to_text(&self.store, &self.config, node).await
    }
}
