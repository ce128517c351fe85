use crate::domain::fee_entry::{EntryId, FeeEntry, StatusPatch};
use crate::domain::payment::PaymentStatus;
use crate::domain::ports::FeeEntryStore;
use crate::error::{FeeError, Result, StatusLabel};
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for fee entries.
///
/// Uses `Arc<RwLock<HashMap<EntryId, FeeEntry>>>` to allow shared concurrent access.
/// The conditional status update runs entirely under the write lock.
#[derive(Default, Clone)]
pub struct InMemoryFeeEntryStore {
    entries: Arc<RwLock<HashMap<EntryId, FeeEntry>>>,
}

impl InMemoryFeeEntryStore {
    /// Creates a new, empty in-memory fee entry store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with existing records, e.g. legacy imports.
    pub fn with_entries(entries: impl IntoIterator<Item = FeeEntry>) -> Self {
        let map = entries
            .into_iter()
            .map(|entry| (entry.id.clone(), entry))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl FeeEntryStore for InMemoryFeeEntryStore {
    async fn create(&self, entry: FeeEntry) -> Result<FeeEntry> {
        let mut entries = self.entries.write().await;
        match entries.entry(entry.id.clone()) {
            Entry::Occupied(_) => Err(FeeError::ValidationError(format!(
                "Fee entry {} already exists",
                entry.id
            ))),
            Entry::Vacant(slot) => Ok(slot.insert(entry).clone()),
        }
    }

    async fn get_by_id(&self, id: &EntryId) -> Result<Option<FeeEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &EntryId,
        expected: Option<PaymentStatus>,
        patch: StatusPatch,
    ) -> Result<FeeEntry> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| FeeError::NotFound(id.clone()))?;

        if entry.status != expected {
            return Err(FeeError::StatusConflict {
                id: id.clone(),
                expected: StatusLabel(expected),
                found: StatusLabel(entry.status),
            });
        }

        entry.apply_patch(patch);
        Ok(entry.clone())
    }

    async fn delete(&self, id: &EntryId) -> Result<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(id).is_some())
    }

    async fn get_all(&self) -> Result<Vec<FeeEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.values().cloned().collect())
    }
}
