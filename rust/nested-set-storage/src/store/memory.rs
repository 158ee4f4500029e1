use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;

use crate::{
    FieldUpdate, NestedSetNode, NestedSetRecord, NestedSetStoreError, NodeFilter, NodeQuery,
};

use super::NodeStore;

/// A trivial implementation of [NodeStore] - backed by a [BTreeMap] - where
/// all records are kept in memory and never persisted.
///
/// Clones share the same underlying records.
pub struct MemoryNodeStore<Record>
where
    Record: NestedSetRecord,
{
    entries: Arc<RwLock<BTreeMap<Record::Id, Record>>>,
}

impl<Record> Clone for MemoryNodeStore<Record>
where
    Record: NestedSetRecord,
{
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<Record> Default for MemoryNodeStore<Record>
where
    Record: NestedSetRecord,
{
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl<Record> MemoryNodeStore<Record>
where
    Record: NestedSetRecord,
{
    /// Seed a store with existing records, as-is
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let entries = records
            .into_iter()
            .map(|record| (record.id().clone(), record))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Seed a store from a JSON array of records
    pub fn from_json(json: &str) -> Result<Self, NestedSetStoreError>
    where
        Record: DeserializeOwned,
    {
        let records: Vec<Record> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    /// Serialize every record, ordered by identity, as a JSON array
    pub async fn to_json(&self) -> Result<String, NestedSetStoreError>
    where
        Record: Serialize,
    {
        let records = self.records().await;
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// A snapshot of every record, ordered by identity
    pub async fn records(&self) -> Vec<Record> {
        self.entries.read().await.values().cloned().collect()
    }

    /// The number of stored records
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True if no records are stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<Record> NodeStore for MemoryNodeStore<Record>
where
    Record: NestedSetRecord,
{
    type Id = Record::Id;
    type Record = Record;
    type Error = NestedSetStoreError;

    async fn get(&self, id: &Self::Id) -> Result<Option<Self::Record>, Self::Error> {
        let entries = self.entries.read().await;
        Ok(entries.get(id).cloned())
    }

    async fn find(&self, query: &NodeQuery<Self::Id>) -> Result<Vec<Self::Record>, Self::Error> {
        let entries = self.entries.read().await;
        Ok(query.select(entries.values().cloned()))
    }

    async fn put(&mut self, record: Self::Record) -> Result<(), Self::Error> {
        let mut entries = self.entries.write().await;
        entries.insert(record.id().clone(), record);
        Ok(())
    }

    async fn update(
        &mut self,
        id: &Self::Id,
        update: FieldUpdate<Self::Id>,
    ) -> Result<(), Self::Error> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(id) {
            Some(record) => {
                record.apply(update);
                Ok(())
            }
            None => Err(NestedSetStoreError::NotFound(format!("{id}"))),
        }
    }

    async fn delete(&mut self, filter: &NodeFilter<Self::Id>) -> Result<usize, Self::Error> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, record| !filter.matches(record));
        Ok(before - entries.len())
    }
}
