use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsortiumError {
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid amount: {field} must be positive (got {value})")]
    InvalidAmount { field: String, value: Decimal },

    #[error("Invalid embedded bid percent: {0} (expected 0 <= percent < 100)")]
    InvalidBidPercent(Decimal),

    #[error(
        "Installment too small: monthly insurance of {monthly_insurance} leaves nothing \
         to amortise within an installment of {max_installment}"
    )]
    InstallmentTooSmall {
        max_installment: Decimal,
        monthly_insurance: Decimal,
    },

    #[error("No remaining installments: a plan of {installment_count} installment(s) cannot absorb the bid")]
    NoRemainingInstallments { installment_count: u32 },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ConsortiumError {
    fn from(e: serde_json::Error) -> Self {
        ConsortiumError::SerializationError(e.to_string())
    }
}
