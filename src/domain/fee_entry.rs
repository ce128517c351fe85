use super::actor::ActorId;
use super::money::{LineItem, Money, total_of};
use super::month::Month;
use super::payment::{PaymentStatus, PaymentType};
use super::policy;
use crate::error::{FeeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resident's fee payment for one or more months.
///
/// The amount, months and payment type are fixed at creation. Only the
/// status-related fields (`status`, `payment_confirmed`, `confirmed_by`,
/// `confirmed_at`) change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeEntry {
    pub id: EntryId,
    pub member: String,
    pub flat: String,
    pub block: String,
    pub months: BTreeSet<Month>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub total_fee: Money,
    pub payment_type: PaymentType,
    #[serde(default)]
    pub remarks: Option<String>,
    /// Absent on records written before statuses were stored explicitly.
    #[serde(default)]
    pub status: Option<PaymentStatus>,
    #[serde(default)]
    pub payment_confirmed: bool,
    #[serde(default)]
    pub confirmed_by: Option<ActorId>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_by: ActorId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The status fields written back to the store by a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPatch {
    pub status: PaymentStatus,
    pub payment_confirmed: bool,
    pub confirmed_by: Option<ActorId>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl FeeEntry {
    pub fn effective_status(&self) -> PaymentStatus {
        policy::effective_status(self)
    }

    /// Confirmation is read through the effective status so legacy records
    /// that never stored `payment_confirmed` are judged by their payment type.
    pub fn is_confirmed(&self) -> bool {
        self.effective_status() == PaymentStatus::Success
    }

    /// Marks the payment as received, recording who confirmed it and when.
    pub fn confirm(&mut self, by: &ActorId, at: DateTime<Utc>) {
        self.status = Some(PaymentStatus::Success);
        self.payment_confirmed = true;
        self.confirmed_by = Some(by.clone());
        self.confirmed_at = Some(at);
    }

    /// Returns the payment to manual review and forgets the confirmation.
    pub fn unconfirm(&mut self) {
        self.status = Some(PaymentStatus::Pending);
        self.payment_confirmed = false;
        self.confirmed_by = None;
        self.confirmed_at = None;
    }

    /// General override. `failed` and `refunded` keep the previous
    /// confirmation metadata as an audit trail.
    pub fn set_status(&mut self, status: PaymentStatus, by: &ActorId, at: DateTime<Utc>) {
        match status {
            PaymentStatus::Success => self.confirm(by, at),
            PaymentStatus::Pending => self.unconfirm(),
            PaymentStatus::Failed | PaymentStatus::Refunded => {
                self.status = Some(status);
                self.payment_confirmed = false;
            }
        }
    }

    pub fn status_patch(&self) -> StatusPatch {
        StatusPatch {
            status: self.effective_status(),
            payment_confirmed: self.payment_confirmed,
            confirmed_by: self.confirmed_by.clone(),
            confirmed_at: self.confirmed_at,
        }
    }

    pub fn apply_patch(&mut self, patch: StatusPatch) {
        self.status = Some(patch.status);
        self.payment_confirmed = patch.payment_confirmed;
        self.confirmed_by = patch.confirmed_by;
        self.confirmed_at = patch.confirmed_at;
    }
}

/// Input for recording a new fee entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeEntryDraft {
    pub id: EntryId,
    pub member: String,
    pub flat: String,
    pub block: String,
    pub months: Vec<Month>,
    pub line_items: Vec<LineItem>,
    pub payment_type: PaymentType,
    pub remarks: Option<String>,
}

impl FeeEntryDraft {
    /// Validates the draft and builds the entry in its initial status.
    pub fn into_entry(self, created_by: &ActorId, created_at: DateTime<Utc>) -> Result<FeeEntry> {
        if self.id.0.trim().is_empty() {
            return Err(FeeError::ValidationError(
                "Fee entry id must not be empty".to_string(),
            ));
        }
        if self.months.is_empty() {
            return Err(FeeError::ValidationError(
                "At least one month is required".to_string(),
            ));
        }

        let mut months = BTreeSet::new();
        for month in self.months {
            if !months.insert(month) {
                return Err(FeeError::ValidationError(format!(
                    "Month {} selected more than once",
                    month
                )));
            }
        }

        let total_fee = total_of(&self.line_items)?;
        let status = policy::classify_initial_status(&self.payment_type);
        Ok(FeeEntry {
            id: self.id,
            member: self.member,
            flat: self.flat,
            block: self.block,
            months,
            total_fee,
            line_items: self.line_items,
            payment_type: self.payment_type,
            remarks: self.remarks.filter(|r| !r.trim().is_empty()),
            status: Some(status),
            payment_confirmed: status == PaymentStatus::Success,
            confirmed_by: None,
            confirmed_at: None,
            created_by: created_by.clone(),
            created_at: Some(created_at),
        })
    }
}
