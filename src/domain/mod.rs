//! Domain layer: fee entries, their value objects, the payment status rules and
//! the ports the application layer talks to.

pub mod actor;
pub mod fee_entry;
pub mod money;
pub mod month;
pub mod payment;
pub mod policy;
pub mod ports;
