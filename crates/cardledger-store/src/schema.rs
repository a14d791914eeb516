//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User records, keyed by `user_id`.
    pub const USERS: &str = "users";

    /// Index: user id by username, keyed by the UTF-8 username.
    pub const USERS_BY_NAME: &str = "users_by_name";

    /// Card records, keyed by `card_id`. The PAN field is encrypted.
    pub const CARDS: &str = "cards";

    /// Index: cards by owner, keyed by `owner_id || card_id`.
    /// Value is empty (index only).
    pub const CARDS_BY_OWNER: &str = "cards_by_owner";

    /// Transaction log, keyed by `transaction_id` (ULID, time-ordered).
    pub const TRANSACTIONS: &str = "transactions";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::USERS,
        cf::USERS_BY_NAME,
        cf::CARDS,
        cf::CARDS_BY_OWNER,
        cf::TRANSACTIONS,
    ]
}
