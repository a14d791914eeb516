//! Transaction records for the append-only transfer log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CardId, TransactionId};
use crate::money::Amount;

/// Description attached to two-leg transfers between a user's own cards.
pub const TRANSFER_DESCRIPTION: &str = "Transfer between own cards";

/// A completed ledger event referencing one or two cards.
///
/// A transaction row exists only for balance adjustments that were durably
/// committed; rejected operations never produce one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID (ULID, time-ordered).
    pub id: TransactionId,

    /// Source card. `None` is reserved for non-transfer ledger events.
    pub card_from: Option<CardId>,

    /// Destination card.
    pub card_to: CardId,

    /// Transferred amount.
    pub amount: Amount,

    /// Three-letter currency code.
    pub currency: String,

    /// Outcome of the transaction.
    pub status: TransactionStatus,

    /// Human-readable description.
    pub description: String,

    /// When the transaction was recorded.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a completed transfer record between two cards.
    #[must_use]
    pub fn transfer(
        card_from: CardId,
        card_to: CardId,
        amount: Amount,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            card_from: Some(card_from),
            card_to,
            amount,
            currency: currency.into(),
            status: TransactionStatus::Completed,
            description: TRANSFER_DESCRIPTION.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Outcome of a transaction.
///
/// The ledger currently only persists `Completed` rows — rejected transfers
/// abort before anything is written. `Failed` exists for partial-failure
/// support in integrations that record their attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// The transfer was applied to both cards.
    Completed,

    /// The transfer was recorded as failed.
    Failed,
}
