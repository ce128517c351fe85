use super::actor::Actor;
use super::fee_entry::{EntryId, FeeEntry, StatusPatch};
use super::payment::PaymentStatus;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence for fee entries.
///
/// `update_status` is a conditional write: it applies `patch` only while the
/// stored status still equals `expected` (`None` for legacy records) and
/// fails with `StatusConflict` otherwise.
#[async_trait]
pub trait FeeEntryStore: Send + Sync {
    async fn create(&self, entry: FeeEntry) -> Result<FeeEntry>;
    async fn get_by_id(&self, id: &EntryId) -> Result<Option<FeeEntry>>;
    async fn update_status(
        &self,
        id: &EntryId,
        expected: Option<PaymentStatus>,
        patch: StatusPatch,
    ) -> Result<FeeEntry>;
    async fn delete(&self, id: &EntryId) -> Result<bool>;
    async fn get_all(&self) -> Result<Vec<FeeEntry>>;
}

pub type FeeEntryStoreBox = Box<dyn FeeEntryStore>;

pub trait ActorProvider: Send + Sync {
    fn current_actor(&self) -> Result<Actor>;
}

pub type ActorProviderBox = Box<dyn ActorProvider>;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub type ClockBox = Box<dyn Clock>;
