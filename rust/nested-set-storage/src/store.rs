use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    ConditionalSend, FieldUpdate, NestedSetRecord, NestedSetStoreError, NodeFilter, NodeId,
    NodeQuery,
};

mod memory;
pub use memory::*;

mod measure;
pub use measure::*;

/// A [NodeStore] is a facade over whatever flat record collection holds the
/// nodes of a tree.
///
/// The tree never assumes anything about the substrate beyond these
/// operations. None of them needs to be atomic with respect to the others:
/// callers that mutate a tree concurrently must serialize those mutations
/// themselves.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait NodeStore: Clone {
    /// The identity type of stored records
    type Id: NodeId;
    /// The record type held by this [NodeStore]
    type Record: NestedSetRecord<Id = Self::Id> + ConditionalSend;
    /// The error type produced by this [NodeStore]
    type Error: Into<NestedSetStoreError>;

    /// Look up a single record by its identity
    async fn get(&self, id: &Self::Id) -> Result<Option<Self::Record>, Self::Error>;

    /// Retrieve every record matching `query`, in the order it requests
    async fn find(&self, query: &NodeQuery<Self::Id>) -> Result<Vec<Self::Record>, Self::Error>;

    /// Write a whole record, replacing any record with the same identity
    async fn put(&mut self, record: Self::Record) -> Result<(), Self::Error>;

    /// Change a single field of a stored record in place
    async fn update(
        &mut self,
        id: &Self::Id,
        update: FieldUpdate<Self::Id>,
    ) -> Result<(), Self::Error>;

    /// Remove every record matching `filter`, returning how many were removed
    async fn delete(&mut self, filter: &NodeFilter<Self::Id>) -> Result<usize, Self::Error>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<T> NodeStore for Arc<Mutex<T>>
where
    T: NodeStore + ConditionalSend,
{
    type Id = T::Id;
    type Record = T::Record;
    type Error = T::Error;

    async fn get(&self, id: &Self::Id) -> Result<Option<Self::Record>, Self::Error> {
        let inner = self.lock().await;
        inner.get(id).await
    }

    async fn find(&self, query: &NodeQuery<Self::Id>) -> Result<Vec<Self::Record>, Self::Error> {
        let inner = self.lock().await;
        inner.find(query).await
    }

    async fn put(&mut self, record: Self::Record) -> Result<(), Self::Error> {
        let mut inner = self.lock().await;
        inner.put(record).await
    }

    async fn update(
        &mut self,
        id: &Self::Id,
        update: FieldUpdate<Self::Id>,
    ) -> Result<(), Self::Error> {
        let mut inner = self.lock().await;
        inner.update(id, update).await
    }

    async fn delete(&mut self, filter: &NodeFilter<Self::Id>) -> Result<usize, Self::Error> {
        let mut inner = self.lock().await;
        inner.delete(filter).await
    }
}
