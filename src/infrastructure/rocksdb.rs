use crate::domain::fee_entry::{EntryId, FeeEntry, StatusPatch};
use crate::domain::payment::PaymentStatus;
use crate::domain::ports::FeeEntryStore;
use crate::error::{FeeError, Result, StatusLabel};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing fee entries.
pub const CF_FEE_ENTRIES: &str = "fee_entries";

/// A persistent store implementation using RocksDB.
///
/// Entries are stored as JSON under their id. Writes that read before they
/// write (`create`, `update_status`) are serialised through `write_lock`, which
/// makes the conditional status update atomic for this process.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "fee_entries" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_entries = ColumnFamilyDescriptor::new(CF_FEE_ENTRIES, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_entries])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn entries_cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_FEE_ENTRIES).ok_or_else(|| {
            FeeError::InternalError(Box::new(std::io::Error::other(
                "Fee entries column family not found",
            )))
        })
    }

    fn read(&self, id: &EntryId) -> Result<Option<FeeEntry>> {
        let cf = self.entries_cf()?;
        match self.db.get_cf(&cf, id.0.as_bytes())? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn write(&self, entry: &FeeEntry) -> Result<()> {
        let cf = self.entries_cf()?;
        let value = serde_json::to_vec(entry).map_err(|e| {
            FeeError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )))
        })?;
        self.db.put_cf(&cf, entry.id.0.as_bytes(), value)?;
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> Result<FeeEntry> {
    serde_json::from_slice(bytes).map_err(|e| {
        FeeError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl FeeEntryStore for RocksDBStore {
    async fn create(&self, entry: FeeEntry) -> Result<FeeEntry> {
        let _guard = self.write_lock.lock().await;
        if self.read(&entry.id)?.is_some() {
            return Err(FeeError::ValidationError(format!(
                "Fee entry {} already exists",
                entry.id
            )));
        }
        self.write(&entry)?;
        Ok(entry)
    }

    async fn get_by_id(&self, id: &EntryId) -> Result<Option<FeeEntry>> {
        self.read(id)
    }

    async fn update_status(
        &self,
        id: &EntryId,
        expected: Option<PaymentStatus>,
        patch: StatusPatch,
    ) -> Result<FeeEntry> {
        let _guard = self.write_lock.lock().await;
        let mut entry = self
            .read(id)?
            .ok_or_else(|| FeeError::NotFound(id.clone()))?;

        if entry.status != expected {
            return Err(FeeError::StatusConflict {
                id: id.clone(),
                expected: StatusLabel(expected),
                found: StatusLabel(entry.status),
            });
        }

        entry.apply_patch(patch);
        self.write(&entry)?;
        Ok(entry)
    }

    async fn delete(&self, id: &EntryId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        if self.read(id)?.is_none() {
            return Ok(false);
        }
        let cf = self.entries_cf()?;
        self.db.delete_cf(&cf, id.0.as_bytes())?;
        Ok(true)
    }

    async fn get_all(&self) -> Result<Vec<FeeEntry>> {
        let cf = self.entries_cf()?;
        let mut entries = Vec::new();

        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            entries.push(decode(&value)?);
        }

        Ok(entries)
    }
}
