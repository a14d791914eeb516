//! Error types for cardledger storage.

use rust_decimal::Decimal;

use cardledger_core::{CardId, CardStatus, LedgerError};

use crate::cipher::CryptoError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
///
/// The compound transfer commit re-validates domain state under its row
/// locks, so the domain-shaped variants here mirror the ledger's own error
/// kinds and convert losslessly into [`LedgerError`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// PAN cipher failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Referenced card does not exist.
    #[error("card not found: {0}")]
    CardNotFound(CardId),

    /// Card is not in the `Active` status required for the operation.
    #[error("card {card_id} is not active: {status}")]
    CardNotActive {
        /// The offending card.
        card_id: CardId,
        /// Its current status.
        status: CardStatus,
    },

    /// Source balance below the requested amount.
    #[error("insufficient funds on card {card_id}: balance={balance}, requested={requested}")]
    InsufficientFunds {
        /// The source card.
        card_id: CardId,
        /// Balance observed under the commit lock.
        balance: Decimal,
        /// Requested transfer amount.
        requested: Decimal,
    },

    /// Both legs of a transfer reference the same card.
    #[error("source and destination cards cannot be the same")]
    SameCard,
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CardNotFound(card_id) => Self::CardNotFound { card_id },
            StoreError::CardNotActive { card_id, status } => {
                Self::CardNotActive { card_id, status }
            }
            StoreError::InsufficientFunds {
                card_id,
                balance,
                requested,
            } => Self::InsufficientFunds {
                card_id,
                balance,
                requested,
            },
            StoreError::SameCard => Self::SameCardTransfer,
            StoreError::Crypto(e) => Self::Crypto(e.to_string()),
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Storage(msg),
        }
    }
}
