//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in
//! column families.

use cardledger_core::{CardId, TransactionId, UserId};

/// Create a user key from a user ID.
#[must_use]
pub fn user_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Create a username index key.
#[must_use]
pub fn username_key(username: &str) -> Vec<u8> {
    username.as_bytes().to_vec()
}

/// Create a card key from a card ID.
#[must_use]
pub fn card_key(card_id: &CardId) -> Vec<u8> {
    card_id.as_bytes().to_vec()
}

/// Create an owner-card index key.
///
/// Format: `owner_id (16 bytes) || card_id (16 bytes)`
#[must_use]
pub fn owner_card_key(owner_id: &UserId, card_id: &CardId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(owner_id.as_bytes());
    key.extend_from_slice(card_id.as_bytes());
    key
}

/// Create a prefix for iterating all cards of an owner.
#[must_use]
pub fn owner_cards_prefix(owner_id: &UserId) -> Vec<u8> {
    owner_id.as_bytes().to_vec()
}

/// Extract the card ID from an owner-card index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_card_id_from_owner_key(key: &[u8]) -> CardId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    CardId::from_bytes(bytes)
}

/// Create a transaction key from a transaction ID.
#[must_use]
pub fn transaction_key(transaction_id: &TransactionId) -> Vec<u8> {
    transaction_id.to_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_key_length() {
        let user_id = UserId::generate();
        assert_eq!(user_key(&user_id).len(), 16);
    }

    #[test]
    fn card_key_length() {
        let card_id = CardId::generate();
        assert_eq!(card_key(&card_id).len(), 16);
    }

    #[test]
    fn owner_card_key_format() {
        let owner_id = UserId::generate();
        let card_id = CardId::generate();
        let key = owner_card_key(&owner_id, &card_id);

        assert_eq!(key.len(), 32);
        assert_eq!(&key[..16], owner_id.as_bytes());
        assert_eq!(&key[16..], card_id.as_bytes());
    }

    #[test]
    fn extract_card_id_roundtrip() {
        let owner_id = UserId::generate();
        let card_id = CardId::generate();
        let key = owner_card_key(&owner_id, &card_id);

        let extracted = extract_card_id_from_owner_key(&key);
        assert_eq!(extracted, card_id);
    }

    #[test]
    fn transaction_key_length() {
        let tx_id = TransactionId::generate();
        assert_eq!(transaction_key(&tx_id).len(), 16);
    }
}
