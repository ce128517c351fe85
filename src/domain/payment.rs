use crate::error::FeeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a resident paid a fee entry.
///
/// Values outside the known set are kept verbatim in `Unrecognized` so they can
/// be routed to manual review instead of being rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentType {
    Upi,
    Imps,
    Card,
    Cash,
    BankTransfer,
    RequestPayment,
    Unrecognized(String),
}

impl PaymentType {
    pub fn label(&self) -> &str {
        match self {
            PaymentType::Upi => "UPI",
            PaymentType::Imps => "IMPS",
            PaymentType::Card => "Card",
            PaymentType::Cash => "Cash",
            PaymentType::BankTransfer => "Bank Transfer",
            PaymentType::RequestPayment => "Request Payment",
            PaymentType::Unrecognized(raw) => raw,
        }
    }

    /// Types without inherent digital proof of payment.
    pub fn requires_manual_confirmation(&self) -> bool {
        matches!(
            self,
            PaymentType::Cash | PaymentType::RequestPayment | PaymentType::Unrecognized(_)
        )
    }
}

impl From<&str> for PaymentType {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "upi" => PaymentType::Upi,
            "imps" => PaymentType::Imps,
            "card" => PaymentType::Card,
            "cash" => PaymentType::Cash,
            "bank transfer" => PaymentType::BankTransfer,
            "request payment" => PaymentType::RequestPayment,
            _ => PaymentType::Unrecognized(trimmed.to_string()),
        }
    }
}

impl From<String> for PaymentType {
    fn from(value: String) -> Self {
        PaymentType::from(value.as_str())
    }
}

impl From<PaymentType> for String {
    fn from(value: PaymentType) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Success,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = FeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "success" => Ok(PaymentStatus::Success),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(FeeError::InvalidStatus(s.to_string())),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
