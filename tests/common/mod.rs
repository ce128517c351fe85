#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use colonyfee::domain::fee_entry::{EntryId, FeeEntryDraft};
use colonyfee::domain::money::{LineItem, Money};
use colonyfee::domain::month::Month;
use colonyfee::domain::payment::PaymentType;
use rust_decimal::Decimal;
use std::io::{Error, Write};
use tempfile::NamedTempFile;

pub const ENTRIES_HEADER: &str =
    "id,member,flat,block,months,payment_type,fee_type,unit_amount,remarks";

pub fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
}

pub fn draft(id: &str, payment_type: &str, unit: Decimal, months: &[Month]) -> FeeEntryDraft {
    FeeEntryDraft {
        id: EntryId::from(id),
        member: "Asha Rao".to_string(),
        flat: "A-101".to_string(),
        block: "A".to_string(),
        months: months.to_vec(),
        line_items: vec![LineItem::new(
            "Maintenance",
            Money::new(unit).unwrap(),
            months.len() as u32,
        )],
        payment_type: PaymentType::from(payment_type),
        remarks: None,
    }
}

/// Writes `rows` (without header) to a temp CSV file that lives as long as the handle.
pub fn csv_file(header: &str, rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{}", header)?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    file.flush()?;
    Ok(file)
}

pub fn entries_file(rows: &[&str]) -> Result<NamedTempFile, Error> {
    csv_file(ENTRIES_HEADER, rows)
}

pub fn actions_file(rows: &[&str]) -> Result<NamedTempFile, Error> {
    csv_file("action,entry,status", rows)
}
