//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use cardledger_core::{
    Balance, Card, CardFilter, CardId, Page, PageRequest, Transaction, TransactionId, User, UserId,
};

use crate::cipher::PanCipher;
use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
///
/// Card rows are written with their PAN encrypted; lookups decrypt on the
/// way out. A per-card lock table serializes the compound transfer commit so
/// concurrent transfers touching an overlapping card never act on a stale
/// balance.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    cipher: PanCipher,
    card_locks: Mutex<HashMap<CardId, Arc<Mutex<()>>>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P, cipher: PanCipher) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            cipher,
            card_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Serialize a card with its PAN encrypted for storage.
    fn encode_card(&self, card: &Card) -> Result<Vec<u8>> {
        let mut stored = card.clone();
        stored.pan = self.cipher.encrypt(&card.pan)?;
        Self::serialize(&stored)
    }

    /// Deserialize a card and decrypt its PAN.
    fn decode_card(&self, data: &[u8]) -> Result<Card> {
        let mut card: Card = Self::deserialize(data)?;
        card.pan = self.cipher.decrypt(&card.pan)?;
        Ok(card)
    }

    /// Queue a card write (record plus owner index entry) into a batch.
    fn batch_put_card(&self, batch: &mut WriteBatch, card: &Card) -> Result<()> {
        let cf_cards = self.cf(cf::CARDS)?;
        let cf_index = self.cf(cf::CARDS_BY_OWNER)?;
        let value = self.encode_card(card)?;

        batch.put_cf(&cf_cards, keys::card_key(&card.id), value);
        batch.put_cf(
            &cf_index,
            keys::owner_card_key(&card.owner_id, &card.id),
            [],
        );
        Ok(())
    }

    /// Fetch the row lock for a card, creating it on first use.
    fn card_lock(&self, card_id: &CardId) -> Arc<Mutex<()>> {
        let mut locks = self.card_locks.lock();
        locks.entry(*card_id).or_default().clone()
    }

    /// Collect every card owned by `owner_id`, ordered by card id.
    fn cards_of_owner(&self, owner_id: &UserId) -> Result<Vec<Card>> {
        let cf_index = self.cf(cf::CARDS_BY_OWNER)?;
        let prefix = keys::owner_cards_prefix(owner_id);

        let iter = self.db.iterator_cf(
            &cf_index,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut cards = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }

            let card_id = keys::extract_card_id_from_owner_key(&key);
            if let Some(card) = self.get_card(&card_id)? {
                cards.push(card);
            }
        }

        Ok(cards)
    }
}

impl Store for RocksStore {
    // =========================================================================
    // User Operations
    // =========================================================================

    fn put_user(&self, user: &User) -> Result<()> {
        let cf_users = self.cf(cf::USERS)?;
        let cf_by_name = self.cf(cf::USERS_BY_NAME)?;
        let value = Self::serialize(user)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_users, keys::user_key(&user.id), value);
        batch.put_cf(
            &cf_by_name,
            keys::username_key(&user.username),
            user.id.as_bytes(),
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        let cf_users = self.cf(cf::USERS)?;

        self.db
            .get_cf(&cf_users, keys::user_key(user_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let cf_by_name = self.cf(cf::USERS_BY_NAME)?;

        let Some(id_bytes) = self
            .db
            .get_cf(&cf_by_name, keys::username_key(username))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let bytes: [u8; 16] = id_bytes
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Database("corrupt username index entry".to_string()))?;

        self.get_user(&UserId::from_bytes(bytes))
    }

    fn user_exists(&self, user_id: &UserId) -> Result<bool> {
        let cf_users = self.cf(cf::USERS)?;
        let exists = self
            .db
            .get_cf(&cf_users, keys::user_key(user_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        Ok(exists)
    }

    // =========================================================================
    // Card Operations
    // =========================================================================

    fn put_card(&self, card: &Card) -> Result<()> {
        let mut batch = WriteBatch::default();
        self.batch_put_card(&mut batch, card)?;

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_card(&self, card_id: &CardId) -> Result<Option<Card>> {
        let cf_cards = self.cf(cf::CARDS)?;

        self.db
            .get_cf(&cf_cards, keys::card_key(card_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| self.decode_card(&data))
            .transpose()
    }

    fn card_exists(&self, card_id: &CardId) -> Result<bool> {
        let cf_cards = self.cf(cf::CARDS)?;
        let exists = self
            .db
            .get_cf(&cf_cards, keys::card_key(card_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        Ok(exists)
    }

    fn delete_card(&self, card_id: &CardId) -> Result<()> {
        let cf_cards = self.cf(cf::CARDS)?;
        let cf_index = self.cf(cf::CARDS_BY_OWNER)?;

        // The owner id is needed for the index key; the PAN stays encrypted.
        let Some(data) = self
            .db
            .get_cf(&cf_cards, keys::card_key(card_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Err(StoreError::CardNotFound(*card_id));
        };
        let stored: Card = Self::deserialize(&data)?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf_cards, keys::card_key(card_id));
        batch.delete_cf(
            &cf_index,
            keys::owner_card_key(&stored.owner_id, card_id),
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn list_cards_by_owner(
        &self,
        owner_id: &UserId,
        filter: &CardFilter,
        page: &PageRequest,
    ) -> Result<Page<Card>> {
        let matching: Vec<Card> = self
            .cards_of_owner(owner_id)?
            .into_iter()
            .filter(|card| filter.matches(card))
            .collect();

        let total = matching.len();
        let items: Vec<Card> = matching
            .into_iter()
            .skip(page.offset())
            .take(page.per_page())
            .collect();

        Ok(Page::new(items, page, total))
    }

    fn list_all_cards(&self, page: &PageRequest) -> Result<Page<Card>> {
        let cf_cards = self.cf(cf::CARDS)?;

        let mut cards = Vec::new();
        for item in self.db.iterator_cf(&cf_cards, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            cards.push(self.decode_card(&value)?);
        }

        let total = cards.len();
        let items: Vec<Card> = cards
            .into_iter()
            .skip(page.offset())
            .take(page.per_page())
            .collect();

        Ok(Page::new(items, page, total))
    }

    // =========================================================================
    // Transaction Log
    // =========================================================================

    fn put_transaction(&self, transaction: &Transaction) -> Result<()> {
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let value = Self::serialize(transaction)?;

        self.db
            .put_cf(&cf_tx, keys::transaction_key(&transaction.id), value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Transaction>> {
        let cf_tx = self.cf(cf::TRANSACTIONS)?;

        self.db
            .get_cf(&cf_tx, keys::transaction_key(transaction_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_transactions(&self, page: &PageRequest) -> Result<Page<Transaction>> {
        let cf_tx = self.cf(cf::TRANSACTIONS)?;

        // ULID keys scan in chronological order.
        let mut transactions = Vec::new();
        for item in self.db.iterator_cf(&cf_tx, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            transactions.push(Self::deserialize(&value)?);
        }

        let total = transactions.len();
        let items: Vec<Transaction> = transactions
            .into_iter()
            .skip(page.offset())
            .take(page.per_page())
            .collect();

        Ok(Page::new(items, page, total))
    }

    // =========================================================================
    // Compound Operations
    // =========================================================================

    fn commit_transfer(
        &self,
        from_id: &CardId,
        to_id: &CardId,
        transaction: &Transaction,
    ) -> Result<(Balance, Balance)> {
        if from_id == to_id {
            return Err(StoreError::SameCard);
        }

        // Acquire both row locks in ascending key order so two transfers over
        // the same pair of cards in opposite directions cannot deadlock.
        let (first, second) = if from_id < to_id {
            (from_id, to_id)
        } else {
            (to_id, from_id)
        };
        let lock_first = self.card_lock(first);
        let lock_second = self.card_lock(second);
        let _guard_first = lock_first.lock();
        let _guard_second = lock_second.lock();

        let mut from = self
            .get_card(from_id)?
            .ok_or(StoreError::CardNotFound(*from_id))?;
        let mut to = self
            .get_card(to_id)?
            .ok_or(StoreError::CardNotFound(*to_id))?;

        // Re-validate under the locks; the balances read here are current.
        if !from.is_active() {
            return Err(StoreError::CardNotActive {
                card_id: from.id,
                status: from.status,
            });
        }
        let amount = transaction.amount;
        if !from.has_funds(amount) {
            return Err(StoreError::InsufficientFunds {
                card_id: from.id,
                balance: from.balance.value(),
                requested: amount.value(),
            });
        }
        if !to.is_active() {
            return Err(StoreError::CardNotActive {
                card_id: to.id,
                status: to.status,
            });
        }

        from.balance -= amount.into();
        to.balance += amount.into();

        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let tx_value = Self::serialize(transaction)?;

        // Both card rows and the transaction record commit in one batch.
        let mut batch = WriteBatch::default();
        self.batch_put_card(&mut batch, &from)?;
        self.batch_put_card(&mut batch, &to)?;
        batch.put_cf(&cf_tx, keys::transaction_key(&transaction.id), tx_value);

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!(
            from = %from.id,
            to = %to.id,
            transaction = %transaction.id,
            "transfer batch committed"
        );

        Ok((from.balance, to.balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardledger_core::{Amount, CardStatus};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    // base64 of the 16-byte key "0123456789abcdef"
    const TEST_KEY: &str = "MDEyMzQ1Njc4OWFiY2RlZg==";

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let cipher = PanCipher::from_base64(TEST_KEY).unwrap();
        let store = RocksStore::open(dir.path(), cipher).unwrap();
        (store, dir)
    }

    fn card_with_balance(owner: &User, pan: &str, balance: Balance) -> Card {
        let mut card = Card::new(owner.id, pan.to_string(), "TEST HOLDER", "12/2030");
        card.balance = balance;
        card
    }

    #[test]
    fn user_crud_and_username_index() {
        let (store, _dir) = create_test_store();
        let user = User::new("alice");

        store.put_user(&user).unwrap();

        assert!(store.user_exists(&user.id).unwrap());
        assert_eq!(store.get_user(&user.id).unwrap().unwrap(), user);
        assert_eq!(
            store.find_user_by_username("alice").unwrap().unwrap(),
            user
        );
        assert!(store.find_user_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn card_crud() {
        let (store, _dir) = create_test_store();
        let user = User::new("alice");
        store.put_user(&user).unwrap();

        let card = card_with_balance(&user, "1111222233334444", Balance::new(dec!(50.00)));
        store.put_card(&card).unwrap();

        assert!(store.card_exists(&card.id).unwrap());
        let retrieved = store.get_card(&card.id).unwrap().unwrap();
        assert_eq!(retrieved, card);
        assert_eq!(retrieved.pan, "1111222233334444");

        store.delete_card(&card.id).unwrap();
        assert!(store.get_card(&card.id).unwrap().is_none());
        assert!(store
            .list_cards_by_owner(&user.id, &CardFilter::any(), &PageRequest::default())
            .unwrap()
            .items
            .is_empty());
    }

    #[test]
    fn delete_missing_card_fails() {
        let (store, _dir) = create_test_store();
        let card_id = CardId::generate();
        assert!(matches!(
            store.delete_card(&card_id),
            Err(StoreError::CardNotFound(id)) if id == card_id
        ));
    }

    #[test]
    fn pan_is_encrypted_at_rest() {
        let (store, _dir) = create_test_store();
        let user = User::new("alice");
        let card = card_with_balance(&user, "1111222233334444", Balance::ZERO);
        store.put_card(&card).unwrap();

        let cf_cards = store.cf(cf::CARDS).unwrap();
        let raw = store
            .db
            .get_cf(&cf_cards, keys::card_key(&card.id))
            .unwrap()
            .unwrap();

        let needle = b"1111222233334444";
        let leaked = raw.windows(needle.len()).any(|w| w == needle);
        assert!(!leaked, "plaintext PAN found in stored bytes");

        // The clear last-4 is still present for filtering.
        let stored: Card = RocksStore::deserialize(&raw).unwrap();
        assert_eq!(stored.pan_last4, "4444");
        assert_ne!(stored.pan, card.pan);
    }

    #[test]
    fn list_cards_by_owner_filters_and_pages() {
        let (store, _dir) = create_test_store();
        let alice = User::new("alice");
        let bob = User::new("bob");
        store.put_user(&alice).unwrap();
        store.put_user(&bob).unwrap();

        let mut blocked = card_with_balance(&alice, "1111222233334444", Balance::ZERO);
        blocked.status = CardStatus::Blocked;
        let active = card_with_balance(&alice, "5555666677778888", Balance::ZERO);
        let other = card_with_balance(&bob, "9999000011112222", Balance::ZERO);
        store.put_card(&blocked).unwrap();
        store.put_card(&active).unwrap();
        store.put_card(&other).unwrap();

        let all = store
            .list_cards_by_owner(&alice.id, &CardFilter::any(), &PageRequest::default())
            .unwrap();
        assert_eq!(all.total, 2);
        assert!(all.items.iter().all(|c| c.owner_id == alice.id));

        let only_blocked = store
            .list_cards_by_owner(
                &alice.id,
                &CardFilter {
                    status: Some(CardStatus::Blocked),
                    pan_last4: None,
                },
                &PageRequest::default(),
            )
            .unwrap();
        assert_eq!(only_blocked.total, 1);
        assert_eq!(only_blocked.items[0].id, blocked.id);

        let by_last4 = store
            .list_cards_by_owner(
                &alice.id,
                &CardFilter {
                    status: None,
                    pan_last4: Some("888".to_string()),
                },
                &PageRequest::default(),
            )
            .unwrap();
        assert_eq!(by_last4.total, 1);
        assert_eq!(by_last4.items[0].id, active.id);

        let page = store
            .list_cards_by_owner(&alice.id, &CardFilter::any(), &PageRequest::new(1, 1))
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages(), 2);
    }

    #[test]
    fn list_all_cards_spans_owners() {
        let (store, _dir) = create_test_store();
        let alice = User::new("alice");
        let bob = User::new("bob");

        store
            .put_card(&card_with_balance(&alice, "1111222233334444", Balance::ZERO))
            .unwrap();
        store
            .put_card(&card_with_balance(&bob, "5555666677778888", Balance::ZERO))
            .unwrap();

        let all = store.list_all_cards(&PageRequest::default()).unwrap();
        assert_eq!(all.total, 2);
    }

    #[test]
    fn transaction_log_roundtrip() {
        let (store, _dir) = create_test_store();
        let tx = Transaction::transfer(
            CardId::generate(),
            CardId::generate(),
            Amount::new(dec!(10.00)).unwrap(),
            "BYN",
        );

        store.put_transaction(&tx).unwrap();
        assert_eq!(store.get_transaction(&tx.id).unwrap().unwrap(), tx);

        let listed = store.list_transactions(&PageRequest::default()).unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.items[0], tx);
    }

    #[test]
    fn commit_transfer_moves_funds_atomically() {
        let (store, _dir) = create_test_store();
        let user = User::new("alice");
        let from = card_with_balance(&user, "1111222233334444", Balance::new(dec!(1000.00)));
        let to = card_with_balance(&user, "5555666677778888", Balance::new(dec!(500.00)));
        store.put_card(&from).unwrap();
        store.put_card(&to).unwrap();

        let tx = Transaction::transfer(from.id, to.id, Amount::new(dec!(100.00)).unwrap(), "BYN");
        let (from_balance, to_balance) = store.commit_transfer(&from.id, &to.id, &tx).unwrap();

        assert_eq!(from_balance, Balance::new(dec!(900.00)));
        assert_eq!(to_balance, Balance::new(dec!(600.00)));
        assert_eq!(
            store.get_card(&from.id).unwrap().unwrap().balance,
            Balance::new(dec!(900.00))
        );
        assert_eq!(
            store.get_card(&to.id).unwrap().unwrap().balance,
            Balance::new(dec!(600.00))
        );
        assert!(store.get_transaction(&tx.id).unwrap().is_some());
    }

    #[test]
    fn commit_transfer_rejects_insufficient_funds() {
        let (store, _dir) = create_test_store();
        let user = User::new("alice");
        let from = card_with_balance(&user, "1111222233334444", Balance::new(dec!(10.00)));
        let to = card_with_balance(&user, "5555666677778888", Balance::ZERO);
        store.put_card(&from).unwrap();
        store.put_card(&to).unwrap();

        let tx = Transaction::transfer(from.id, to.id, Amount::new(dec!(10.01)).unwrap(), "BYN");
        let result = store.commit_transfer(&from.id, &to.id, &tx);

        assert!(matches!(
            result,
            Err(StoreError::InsufficientFunds { .. })
        ));
        // Nothing was written: balances unchanged, no transaction row.
        assert_eq!(
            store.get_card(&from.id).unwrap().unwrap().balance,
            Balance::new(dec!(10.00))
        );
        assert_eq!(store.get_card(&to.id).unwrap().unwrap().balance, Balance::ZERO);
        assert!(store.get_transaction(&tx.id).unwrap().is_none());
        assert_eq!(store.list_transactions(&PageRequest::default()).unwrap().total, 0);
    }

    #[test]
    fn commit_transfer_rejects_inactive_cards() {
        let (store, _dir) = create_test_store();
        let user = User::new("alice");
        let mut from = card_with_balance(&user, "1111222233334444", Balance::new(dec!(100.00)));
        from.status = CardStatus::Blocked;
        let to = card_with_balance(&user, "5555666677778888", Balance::ZERO);
        store.put_card(&from).unwrap();
        store.put_card(&to).unwrap();

        let tx = Transaction::transfer(from.id, to.id, Amount::new(dec!(50.00)).unwrap(), "BYN");
        assert!(matches!(
            store.commit_transfer(&from.id, &to.id, &tx),
            Err(StoreError::CardNotActive { .. })
        ));
        assert_eq!(
            store.get_card(&from.id).unwrap().unwrap().balance,
            Balance::new(dec!(100.00))
        );
        assert!(store.get_transaction(&tx.id).unwrap().is_none());
    }

    #[test]
    fn commit_transfer_rejects_same_card() {
        let (store, _dir) = create_test_store();
        let user = User::new("alice");
        let card = card_with_balance(&user, "1111222233334444", Balance::new(dec!(100.00)));
        store.put_card(&card).unwrap();

        let tx = Transaction::transfer(card.id, card.id, Amount::new(dec!(1.00)).unwrap(), "BYN");
        assert!(matches!(
            store.commit_transfer(&card.id, &card.id, &tx),
            Err(StoreError::SameCard)
        ));
    }

    #[test]
    fn commit_transfer_rejects_missing_card() {
        let (store, _dir) = create_test_store();
        let user = User::new("alice");
        let from = card_with_balance(&user, "1111222233334444", Balance::new(dec!(100.00)));
        store.put_card(&from).unwrap();
        let ghost = CardId::generate();

        let tx = Transaction::transfer(from.id, ghost, Amount::new(dec!(1.00)).unwrap(), "BYN");
        assert!(matches!(
            store.commit_transfer(&from.id, &ghost, &tx),
            Err(StoreError::CardNotFound(id)) if id == ghost
        ));
    }
}
