//! The card ledger engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cardledger_core::{
    Amount, Card, CardId, CardStatus, LedgerError, Result, Transaction, User, UserId,
};
use cardledger_store::Store;

use crate::config::EngineConfig;
use crate::pan::{PanGenerator, RandomPanGenerator};

/// A validated transfer request between two of the caller's own cards.
///
/// The boundary has already checked request shape (presence, amount
/// positivity); the engine re-checks every domain rule itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Source card.
    pub from_card: CardId,

    /// Destination card.
    pub to_card: CardId,

    /// Amount to move.
    pub amount: Amount,

    /// Optional currency code; the engine default applies when absent.
    pub currency: Option<String>,
}

/// The ledger engine.
///
/// Owns all card invariants: status-gated operations, ownership scoping, the
/// no-negative-balance rule, and the atomicity of two-leg transfers. Holds
/// no in-process locks itself — concurrent safety comes from the store's
/// commit path.
pub struct CardLedger<S: Store> {
    store: Arc<S>,
    pan_generator: Box<dyn PanGenerator>,
    default_currency: String,
}

impl<S: Store> CardLedger<S> {
    /// Create an engine over `store` with the default PAN generator.
    #[must_use]
    pub fn new(store: Arc<S>, config: &EngineConfig) -> Self {
        Self {
            store,
            pan_generator: Box::new(RandomPanGenerator),
            default_currency: config.default_currency.clone(),
        }
    }

    /// Replace the PAN issuance collaborator.
    #[must_use]
    pub fn with_pan_generator(mut self, generator: Box<dyn PanGenerator>) -> Self {
        self.pan_generator = generator;
        self
    }

    /// Create a card for an existing user.
    ///
    /// The new card starts `Active` with a zero balance; the PAN comes from
    /// the issuance collaborator and only its last four digits stay in
    /// clear. Holder name and expiry syntax are the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UserNotFound`] if the owner does not exist.
    pub fn create_card(
        &self,
        owner_id: &UserId,
        holder_name: &str,
        expiry_date: &str,
    ) -> Result<Card> {
        if !self.store.user_exists(owner_id)? {
            return Err(LedgerError::UserNotFound {
                identity: owner_id.to_string(),
            });
        }

        let pan = self.pan_generator.generate_pan();
        let card = Card::new(*owner_id, pan, holder_name, expiry_date);
        self.store.put_card(&card)?;

        tracing::info!(card = %card.id, owner = %owner_id, "card created");
        Ok(card)
    }

    /// Block a card (administrative).
    ///
    /// The overwrite is unconditional: blocking an already-blocked card
    /// succeeds and leaves it blocked.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CardNotFound`] if the card does not exist.
    pub fn block_card(&self, card_id: &CardId) -> Result<Card> {
        self.set_status(card_id, CardStatus::Blocked)
    }

    /// Activate a card (administrative). Idempotent like [`Self::block_card`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CardNotFound`] if the card does not exist.
    pub fn activate_card(&self, card_id: &CardId) -> Result<Card> {
        self.set_status(card_id, CardStatus::Active)
    }

    /// Block one of the requester's own cards.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UserNotFound`] if the username does not
    /// resolve, and [`LedgerError::CardNotFound`] if the card is missing
    /// *or* owned by someone else — the two cases are indistinguishable on
    /// purpose.
    pub fn request_card_block(&self, card_id: &CardId, username: &str) -> Result<Card> {
        let user = self.resolve_user(username)?;
        self.find_owned_card(card_id, &user.id)?;
        self.set_status(card_id, CardStatus::Blocked)
    }

    /// Hard-delete a card (administrative).
    ///
    /// Historical transactions referencing the card are kept untouched; the
    /// transaction log is audit data, not a foreign-key graph.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CardNotFound`] if the card does not exist.
    pub fn delete_card(&self, card_id: &CardId) -> Result<()> {
        self.store.delete_card(card_id)?;
        tracing::info!(card = %card_id, "card deleted");
        Ok(())
    }

    /// Transfer funds between two cards owned by the same user.
    ///
    /// Validation happens strictly before any mutation: same-card check,
    /// ownership resolution, source status and funds, destination status.
    /// The store then re-validates under its row locks and commits both card
    /// updates and the transaction record as one atomic unit — a rejected or
    /// failed transfer leaves no observable change and no transaction row.
    ///
    /// A storage failure aborts the whole transfer with nothing applied, so
    /// the operation is safe to retry wholesale (no idempotency keys are
    /// provided).
    ///
    /// # Errors
    ///
    /// - [`LedgerError::SameCardTransfer`] if both legs name one card.
    /// - [`LedgerError::UserNotFound`] if the username does not resolve.
    /// - [`LedgerError::CardNotFound`] per card that is missing or foreign.
    /// - [`LedgerError::CardNotActive`] if either card is not active.
    /// - [`LedgerError::InsufficientFunds`] if the source balance is short.
    pub fn transfer_between_own_cards(
        &self,
        username: &str,
        request: &TransferRequest,
    ) -> Result<Transaction> {
        if request.from_card == request.to_card {
            return Err(LedgerError::SameCardTransfer);
        }

        let user = self.resolve_user(username)?;
        let from = self.find_owned_card(&request.from_card, &user.id)?;
        let to = self.find_owned_card(&request.to_card, &user.id)?;

        // Fast-path validation on the snapshot just read; the store repeats
        // these checks under its row locks before committing.
        if !from.is_active() {
            return Err(LedgerError::CardNotActive {
                card_id: from.id,
                status: from.status,
            });
        }
        if !from.has_funds(request.amount) {
            return Err(LedgerError::InsufficientFunds {
                card_id: from.id,
                balance: from.balance.value(),
                requested: request.amount.value(),
            });
        }
        if !to.is_active() {
            return Err(LedgerError::CardNotActive {
                card_id: to.id,
                status: to.status,
            });
        }

        let currency = request
            .currency
            .clone()
            .unwrap_or_else(|| self.default_currency.clone());
        let transaction = Transaction::transfer(from.id, to.id, request.amount, currency);

        self.store
            .commit_transfer(&from.id, &to.id, &transaction)?;

        tracing::info!(
            transaction = %transaction.id,
            from = %from.id,
            to = %to.id,
            amount = %transaction.amount,
            "transfer completed"
        );
        Ok(transaction)
    }

    /// Shared store handle, for the read-only query layer.
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    fn set_status(&self, card_id: &CardId, status: CardStatus) -> Result<Card> {
        let mut card = self
            .store
            .get_card(card_id)?
            .ok_or(LedgerError::CardNotFound { card_id: *card_id })?;

        card.status = status;
        self.store.put_card(&card)?;

        tracing::info!(card = %card.id, status = %status, "card status updated");
        Ok(card)
    }

    fn resolve_user(&self, username: &str) -> Result<User> {
        self.store
            .find_user_by_username(username)?
            .ok_or_else(|| LedgerError::UserNotFound {
                identity: username.to_string(),
            })
    }

    fn find_owned_card(&self, card_id: &CardId, owner_id: &UserId) -> Result<Card> {
        match self.store.get_card(card_id)? {
            Some(card) if card.owner_id == *owner_id => Ok(card),
            // A card owned by someone else reads exactly like a missing one.
            _ => Err(LedgerError::CardNotFound { card_id: *card_id }),
        }
    }
}
