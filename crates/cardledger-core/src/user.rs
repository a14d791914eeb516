//! Minimal user record.
//!
//! Accounts, roles, and credentials live in the surrounding system; the
//! ledger only needs to resolve a user's identity and username to check
//! card ownership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A user known to the card ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,

    /// Login name, unique across users.
    pub username: String,

    /// When the user record was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            username: username.into(),
            created_at: Utc::now(),
        }
    }
}
