//! Interface adapters translating external formats to and from the domain.

pub mod csv;
