//! Card entity and filtering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{CardId, UserId};
use crate::money::{Amount, Balance};

/// A bank card owned by exactly one user.
///
/// The `pan` field holds the full card number. It exists in plaintext only in
/// memory; the storage layer encrypts it before anything reaches disk and
/// decrypts it on load. `pan_last4` stays in clear for lookup and masking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Unique card identifier, assigned at creation.
    pub id: CardId,

    /// The owning user. Set exactly once; ownership never changes.
    pub owner_id: UserId,

    /// Full primary account number.
    pub pan: String,

    /// Last four digits of the PAN, stored in clear.
    pub pan_last4: String,

    /// Card holder name as embossed.
    pub holder_name: String,

    /// Expiry date in `MM/YYYY` format.
    pub expiry_date: String,

    /// Current card status.
    pub status: CardStatus,

    /// Current balance. Never negative.
    pub balance: Balance,

    /// When the card was created.
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Create a new card with status `Active` and a zero balance.
    ///
    /// The last four digits are derived from the supplied PAN.
    #[must_use]
    pub fn new(
        owner_id: UserId,
        pan: String,
        holder_name: impl Into<String>,
        expiry_date: impl Into<String>,
    ) -> Self {
        let pan_last4 = pan[pan.len().saturating_sub(4)..].to_string();
        Self {
            id: CardId::generate(),
            owner_id,
            pan,
            pan_last4,
            holder_name: holder_name.into(),
            expiry_date: expiry_date.into(),
            status: CardStatus::Active,
            balance: Balance::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Check whether the card can take part in transfers.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == CardStatus::Active
    }

    /// Check whether the balance covers a withdrawal of `amount`.
    #[must_use]
    pub fn has_funds(&self, amount: Amount) -> bool {
        self.balance >= amount.into()
    }

    /// Masked PAN for display, e.g. `**** **** **** 4444`.
    #[must_use]
    pub fn masked_pan(&self) -> String {
        if self.pan_last4.len() == 4 {
            format!("**** **** **** {}", self.pan_last4)
        } else {
            "**** **** **** ****".to_string()
        }
    }
}

/// Status of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    /// Card is usable for transfers.
    Active,

    /// Card is blocked by an administrator or by its owner.
    Blocked,

    /// Card has passed its expiry date. Reserved: no operation currently
    /// produces this status.
    Expired,
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Expired => "expired",
        };
        f.write_str(name)
    }
}

/// Filter predicates for card listings. All present predicates are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFilter {
    /// Match cards with exactly this status.
    pub status: Option<CardStatus>,

    /// Substring match on the clear-text last four digits. A blank string
    /// means no filter.
    pub pan_last4: Option<String>,
}

impl CardFilter {
    /// A filter that matches every card.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Check whether a card satisfies every present predicate.
    #[must_use]
    pub fn matches(&self, card: &Card) -> bool {
        if let Some(status) = self.status {
            if card.status != status {
                return false;
            }
        }
        if let Some(fragment) = &self.pan_last4 {
            if !fragment.trim().is_empty() && !card.pan_last4.contains(fragment.trim()) {
                return false;
            }
        }
        true
    }
}
