use crate::domain::fee_entry::FeeEntry;
use crate::error::Result;
use chrono::SecondsFormat;
use serde::Serialize;
use std::io::Write;

/// One output row. `status` is the effective status, so legacy records print
/// the status implied by their payment type.
#[derive(Debug, Serialize)]
struct LedgerRow<'a> {
    id: &'a str,
    member: &'a str,
    flat: &'a str,
    block: &'a str,
    months: String,
    payment_type: &'a str,
    total_fee: String,
    status: &'static str,
    payment_confirmed: bool,
    confirmed_by: Option<&'a str>,
    confirmed_at: Option<String>,
    created_by: &'a str,
}

impl<'a> From<&'a FeeEntry> for LedgerRow<'a> {
    fn from(entry: &'a FeeEntry) -> Self {
        Self {
            id: &entry.id.0,
            member: &entry.member,
            flat: &entry.flat,
            block: &entry.block,
            months: entry
                .months
                .iter()
                .map(|month| month.name())
                .collect::<Vec<_>>()
                .join(";"),
            payment_type: entry.payment_type.label(),
            total_fee: entry.total_fee.to_string(),
            status: entry.effective_status().as_str(),
            payment_confirmed: entry.payment_confirmed,
            confirmed_by: entry.confirmed_by.as_ref().map(|id| id.0.as_str()),
            confirmed_at: entry
                .confirmed_at
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            created_by: &entry.created_by.0,
        }
    }
}

/// Writes fee entries as CSV, header first.
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_entries<'a>(
        &mut self,
        entries: impl IntoIterator<Item = &'a FeeEntry>,
    ) -> Result<()> {
        for entry in entries {
            self.writer.serialize(LedgerRow::from(entry))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
