//! Payment status rules shared by every caller.
//!
//! These are the only places that decide whether a payment type is
//! auto-confirmed and which roles may move a payment between states.

use super::actor::Role;
use super::fee_entry::FeeEntry;
use super::payment::{PaymentStatus, PaymentType};

/// Status a new entry starts in, decided by its payment type alone.
///
/// Anything without inherent digital proof, including unrecognized or empty
/// types, waits for manual confirmation.
pub fn classify_initial_status(payment_type: &PaymentType) -> PaymentStatus {
    if payment_type.requires_manual_confirmation() {
        PaymentStatus::Pending
    } else {
        PaymentStatus::Success
    }
}

/// The explicit status when one is stored, otherwise the status implied by the
/// payment type. Records written before the status field existed carry none.
pub fn effective_status(entry: &FeeEntry) -> PaymentStatus {
    entry
        .status
        .unwrap_or_else(|| classify_initial_status(&entry.payment_type))
}

/// Whether `role` may confirm, unconfirm or override a payment status.
pub fn can_transition(role: &Role) -> bool {
    matches!(
        role,
        Role::SuperAdmin | Role::ColonyAdmin | Role::BlockManager
    )
}
