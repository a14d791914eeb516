//! `RocksDB` storage layer for cardledger.
//!
//! This crate provides persistent storage for users, cards, and the
//! transaction log, plus the PAN cipher that keeps card numbers encrypted at
//! rest.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `users`: user records, keyed by `user_id`
//! - `users_by_name`: index from username to `user_id`
//! - `cards`: card records, keyed by `card_id`; the PAN field is AES-encrypted
//! - `cards_by_owner`: index for listing a user's cards
//! - `transactions`: append-only transfer log, keyed by ULID
//!
//! # Example
//!
//! ```no_run
//! use cardledger_core::{Card, User};
//! use cardledger_store::{PanCipher, RocksStore, Store};
//!
//! let cipher = PanCipher::from_base64("MDEyMzQ1Njc4OWFiY2RlZg==").unwrap();
//! let store = RocksStore::open("/tmp/cardledger-db", cipher).unwrap();
//!
//! let user = User::new("alice");
//! store.put_user(&user).unwrap();
//!
//! let card = Card::new(user.id, "1111222233334444".into(), "ALICE A", "12/2030");
//! store.put_card(&card).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cipher;
pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use cipher::{CryptoError, PanCipher};
pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use cardledger_core::{
    Balance, Card, CardFilter, CardId, Page, PageRequest, Transaction, TransactionId, User, UserId,
};

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (production `RocksDB`, failure-injecting wrappers in
/// tests).
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert or update a user record and its username index entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_user(&self, user: &User) -> Result<()>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// Resolve a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Check whether a user exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn user_exists(&self, user_id: &UserId) -> Result<bool>;

    // =========================================================================
    // Card Operations
    // =========================================================================

    /// Insert or update a card record (upsert by identity).
    ///
    /// The owner index entry is written in the same atomic batch. The PAN is
    /// encrypted before anything reaches disk.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption or the database operation fails.
    fn put_card(&self, card: &Card) -> Result<()>;

    /// Get a card by ID, with the PAN decrypted.
    ///
    /// # Errors
    ///
    /// Returns an error if decryption or the database operation fails.
    fn get_card(&self, card_id: &CardId) -> Result<Option<Card>>;

    /// Check whether a card exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn card_exists(&self, card_id: &CardId) -> Result<bool>;

    /// Hard-delete a card and its owner index entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CardNotFound`] if the card doesn't exist.
    fn delete_card(&self, card_id: &CardId) -> Result<()>;

    /// List an owner's cards matching `filter`, one page at a time.
    ///
    /// Results are ordered by card id. `total` counts every matching card,
    /// not just the returned page.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_cards_by_owner(
        &self,
        owner_id: &UserId,
        filter: &CardFilter,
        page: &PageRequest,
    ) -> Result<Page<Card>>;

    /// List every card in the system, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_all_cards(&self, page: &PageRequest) -> Result<Page<Card>>;

    // =========================================================================
    // Transaction Log
    // =========================================================================

    /// Append a transaction record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Get a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Transaction>>;

    /// Read the transaction log in chronological order, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions(&self, page: &PageRequest) -> Result<Page<Transaction>>;

    // =========================================================================
    // Compound Operations
    // =========================================================================

    /// Commit a validated transfer atomically.
    ///
    /// Under per-card row locks acquired in ascending key order, re-reads
    /// both cards, re-validates that both are active and the source covers
    /// the amount, applies the debit and credit, and writes both cards plus
    /// the transaction record in a single batch. Either all three writes are
    /// durable or none are.
    ///
    /// Returns the new source and destination balances.
    ///
    /// # Errors
    ///
    /// - [`StoreError::SameCard`] if both legs reference one card.
    /// - [`StoreError::CardNotFound`] if either card is missing.
    /// - [`StoreError::CardNotActive`] if either card is not active.
    /// - [`StoreError::InsufficientFunds`] if the source balance is short.
    fn commit_transfer(
        &self,
        from_id: &CardId,
        to_id: &CardId,
        transaction: &Transaction,
    ) -> Result<(Balance, Balance)>;
}
