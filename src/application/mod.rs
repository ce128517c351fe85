//! Application layer containing the payment status orchestration.
//!
//! This module defines the `PaymentStatusEngine`, the single entry point through
//! which presentation code records fee entries and moves their payment status.
//! It combines the pure rules in `domain::policy` with a `FeeEntryStore`.

pub mod engine;
