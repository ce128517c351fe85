use crate::domain::fee_entry::{EntryId, FeeEntryDraft};
use crate::domain::money::{LineItem, Money};
use crate::domain::month::Month;
use crate::domain::payment::PaymentType;
use crate::error::{FeeError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::str::FromStr;

/// Separator between month names inside the `months` column.
pub const MONTH_SEPARATOR: char = ';';

#[derive(Debug, Deserialize)]
struct EntryRecord {
    id: String,
    member: String,
    flat: String,
    block: String,
    months: String,
    payment_type: String,
    fee_type: String,
    // Kept as text so fractional amounts never pass through f64.
    unit_amount: String,
    #[serde(default)]
    remarks: Option<String>,
}

impl EntryRecord {
    fn into_draft(self) -> Result<FeeEntryDraft> {
        let months = self
            .months
            .split(MONTH_SEPARATOR)
            .filter(|name| !name.trim().is_empty())
            .map(str::parse::<Month>)
            .collect::<Result<Vec<Month>>>()?;
        let unit_amount = Decimal::from_str(&self.unit_amount).map_err(|e| {
            FeeError::ValidationError(format!("Invalid amount `{}`: {}", self.unit_amount, e))
        })?;
        let unit_amount = Money::new(unit_amount)?;
        // The fee type is billed once per selected month.
        let line_items = vec![LineItem::new(
            self.fee_type,
            unit_amount,
            months.len() as u32,
        )];

        Ok(FeeEntryDraft {
            id: EntryId(self.id),
            member: self.member,
            flat: self.flat,
            block: self.block,
            months,
            line_items,
            payment_type: PaymentType::from(self.payment_type),
            remarks: self.remarks,
        })
    }
}

/// Reads new fee entries from a CSV source.
///
/// Expected columns: `id, member, flat, block, months, payment_type, fee_type,
/// unit_amount, remarks`, with `months` separated by `;`.
pub struct EntryReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EntryReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields one draft per row; a bad row fails alone.
    pub fn drafts(self) -> impl Iterator<Item = Result<FeeEntryDraft>> {
        self.reader
            .into_deserialize::<EntryRecord>()
            .map(|result| {
                result
                    .map_err(FeeError::from)
                    .and_then(EntryRecord::into_draft)
            })
    }
}
