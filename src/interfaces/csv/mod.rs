pub mod action_reader;
pub mod entry_reader;
pub mod ledger_writer;
