use async_trait::async_trait;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use crate::{ConditionalSync, FieldUpdate, NodeFilter, NodeQuery};

use super::NodeStore;

/// A [MeasuredNodeStore] acts as a proxy over a [NodeStore] implementation
/// that measures reads and writes.
///
/// Lookups and queries count as reads. Puts, partial updates and deletes
/// count as writes.
#[derive(Clone)]
pub struct MeasuredNodeStore<Store>
where
    Store: NodeStore,
{
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    store: Store,
}

impl<Store> MeasuredNodeStore<Store>
where
    Store: NodeStore,
{
    /// Wrap the provided [NodeStore] so that reads and writes to it may be
    /// measured.
    pub fn new(store: Store) -> Self {
        Self {
            reads: Arc::new(AtomicUsize::default()),
            writes: Arc::new(AtomicUsize::default()),
            store,
        }
    }

    /// The aggregate number of reads from the wrapped [NodeStore]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// The aggregate number of writes to the wrapped [NodeStore]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Zero both counters
    pub fn reset(&self) {
        self.reads.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
    }

    /// The wrapped [NodeStore]
    pub fn inner(&self) -> &Store {
        &self.store
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<Store> NodeStore for MeasuredNodeStore<Store>
where
    Store: NodeStore + ConditionalSync,
{
    type Id = Store::Id;
    type Record = Store::Record;
    type Error = Store::Error;

    async fn get(&self, id: &Self::Id) -> Result<Option<Self::Record>, Self::Error> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.store.get(id).await
    }

    async fn find(&self, query: &NodeQuery<Self::Id>) -> Result<Vec<Self::Record>, Self::Error> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.store.find(query).await
    }

    async fn put(&mut self, record: Self::Record) -> Result<(), Self::Error> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.store.put(record).await
    }

    async fn update(
        &mut self,
        id: &Self::Id,
        update: FieldUpdate<Self::Id>,
    ) -> Result<(), Self::Error> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.store.update(id, update).await
    }

    async fn delete(&mut self, filter: &NodeFilter<Self::Id>) -> Result<usize, Self::Error> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.store.delete(filter).await
    }
}
