//! Error types for cardledger operations.

use rust_decimal::Decimal;

use crate::card::CardStatus;
use crate::ids::{CardId, IdError};

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors surfaced by the card ledger.
///
/// Ownership-scoped lookups report a card that exists but belongs to someone
/// else as [`LedgerError::CardNotFound`], so callers cannot probe which card
/// ids exist.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The referenced user does not exist.
    #[error("user not found: {identity}")]
    UserNotFound {
        /// User id or username that failed to resolve.
        identity: String,
    },

    /// The referenced card does not exist, or is not owned by the requester.
    #[error("card not found: {card_id}")]
    CardNotFound {
        /// The card that failed to resolve.
        card_id: CardId,
    },

    /// Source and destination of a transfer are the same card.
    #[error("source and destination cards cannot be the same")]
    SameCardTransfer,

    /// The card is not in the `Active` status required for the operation.
    #[error("card {card_id} is not active: {status}")]
    CardNotActive {
        /// The offending card.
        card_id: CardId,
        /// Its current status.
        status: CardStatus,
    },

    /// The source card balance does not cover the requested amount.
    #[error("insufficient funds on card {card_id}: balance={balance}, requested={requested}")]
    InsufficientFunds {
        /// The source card.
        card_id: CardId,
        /// Balance at validation time.
        balance: Decimal,
        /// Requested transfer amount.
        requested: Decimal,
    },

    /// A money value violated the amount rules.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// PAN cipher malfunction. Fatal configuration problem, not part of
    /// normal control flow.
    #[error("cipher failure: {0}")]
    Crypto(String),

    /// Underlying storage failed. The whole operation was aborted with no
    /// writes applied; safe to retry at whole-operation granularity.
    #[error("storage error: {0}")]
    Storage(String),

    /// Startup configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl LedgerError {
    /// Whether this error should surface as a plain not-found to callers.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. } | Self::CardNotFound { .. }
        )
    }
}
