//! Read-only card views.
//!
//! Thin projections over the card store's filtering rules. The full PAN
//! never leaves this layer — summaries carry the masked form only.

use serde::{Deserialize, Serialize};

use cardledger_core::{
    Balance, Card, CardFilter, CardId, CardStatus, LedgerError, Page, PageRequest, Result,
    Transaction, UserId,
};
use cardledger_store::Store;

use crate::ledger::CardLedger;

/// A card as presented to callers: masked PAN, no owner internals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    /// Card identifier.
    pub id: CardId,

    /// Masked PAN, e.g. `**** **** **** 4444`.
    pub masked_pan: String,

    /// Card holder name.
    pub holder_name: String,

    /// Expiry date in `MM/YYYY` format.
    pub expiry_date: String,

    /// Current status.
    pub status: CardStatus,

    /// Current balance.
    pub balance: Balance,
}

impl From<&Card> for CardSummary {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id,
            masked_pan: card.masked_pan(),
            holder_name: card.holder_name.clone(),
            expiry_date: card.expiry_date.clone(),
            status: card.status,
            balance: card.balance,
        }
    }
}

impl<S: Store> CardLedger<S> {
    /// List a user's cards, filtered and paginated.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UserNotFound`] if the owner does not exist.
    pub fn cards_for_user(
        &self,
        owner_id: &UserId,
        filter: &CardFilter,
        page: &PageRequest,
    ) -> Result<Page<CardSummary>> {
        if !self.store().user_exists(owner_id)? {
            return Err(LedgerError::UserNotFound {
                identity: owner_id.to_string(),
            });
        }

        let cards = self.store().list_cards_by_owner(owner_id, filter, page)?;
        Ok(cards.map(|card| CardSummary::from(&card)))
    }

    /// List every card in the system (administrative view).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if the store read fails.
    pub fn all_cards(&self, page: &PageRequest) -> Result<Page<CardSummary>> {
        let cards = self.store().list_all_cards(page)?;
        Ok(cards.map(|card| CardSummary::from(&card)))
    }

    /// Read the transaction log in chronological order.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if the store read fails.
    pub fn transaction_log(&self, page: &PageRequest) -> Result<Page<Transaction>> {
        Ok(self.store().list_transactions(page)?)
    }
}
