use crate::domain::actor::Role;
use crate::domain::fee_entry::EntryId;
use crate::domain::payment::PaymentStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeeError {
    #[error("Permission denied: role `{0}` cannot change payment status")]
    PermissionDenied(Role),
    #[error("Invalid payment status: `{0}`")]
    InvalidStatus(String),
    #[error("Fee entry not found: {0}")]
    NotFound(EntryId),
    #[error("Fee entry store unavailable: {0}")]
    StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Fee entry {id} changed concurrently (expected {expected}, found {found})")]
    StatusConflict {
        id: EntryId,
        expected: StatusLabel,
        found: StatusLabel,
    },
    #[error("No authenticated actor")]
    Unauthenticated,
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FeeError {
    /// Whether the caller may reasonably offer the user a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FeeError::StoreUnavailable(_) | FeeError::StatusConflict { .. }
        )
    }
}

/// Display form of a stored status, where `unset` marks a legacy record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusLabel(pub Option<PaymentStatus>);

impl std::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(status) => write!(f, "{}", status),
            None => f.write_str("unset"),
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for FeeError {
    fn from(err: rocksdb::Error) -> Self {
        FeeError::StoreUnavailable(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, FeeError>;
