use crate::application::engine::StatusAction;
use crate::domain::fee_entry::EntryId;
use crate::domain::payment::PaymentStatus;
use crate::error::{FeeError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct ActionRecord {
    action: String,
    entry: String,
    #[serde(default)]
    status: Option<String>,
}

impl ActionRecord {
    fn into_action(self) -> Result<StatusAction> {
        let id = EntryId(self.entry);
        match self.action.to_ascii_lowercase().as_str() {
            "confirm" => Ok(StatusAction::Confirm(id)),
            "unconfirm" => Ok(StatusAction::Unconfirm(id)),
            "set" => {
                let raw = self.status.unwrap_or_default();
                let status: PaymentStatus = raw.parse()?;
                Ok(StatusAction::Set(id, status))
            }
            other => Err(FeeError::ValidationError(format!(
                "Unknown action `{}` for entry {}",
                other, id
            ))),
        }
    }
}

/// Reads status actions (`action, entry, status`) from a CSV source.
pub struct ActionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ActionReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn actions(self) -> impl Iterator<Item = Result<StatusAction>> {
        self.reader
            .into_deserialize::<ActionRecord>()
            .map(|result| result.map_err(FeeError::from).and_then(ActionRecord::into_action))
    }
}
