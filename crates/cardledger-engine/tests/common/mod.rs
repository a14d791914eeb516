//! Shared test harness: an engine over a temporary `RocksDB` store.

use std::sync::Arc;

use rust_decimal::Decimal;
use tempfile::TempDir;

use cardledger_core::{Balance, Card, User};
use cardledger_engine::{CardLedger, EngineConfig};
use cardledger_store::{PanCipher, RocksStore, Store};

/// base64 of the 16-byte key "0123456789abcdef"
pub const TEST_KEY: &str = "MDEyMzQ1Njc4OWFiY2RlZg==";

pub struct TestHarness {
    pub ledger: CardLedger<RocksStore>,
    pub store: Arc<RocksStore>,
    _dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let cipher = PanCipher::from_base64(TEST_KEY).unwrap();
        let store = Arc::new(RocksStore::open(dir.path(), cipher).unwrap());
        let config = EngineConfig::new(dir.path().to_string_lossy(), TEST_KEY);
        let ledger = CardLedger::new(Arc::clone(&store), &config);
        Self {
            ledger,
            store,
            _dir: dir,
        }
    }

    /// Register a user directly in the store, as the excluded registration
    /// flow would.
    pub fn register_user(&self, username: &str) -> User {
        let user = User::new(username);
        self.store.put_user(&user).unwrap();
        user
    }

    /// Create a card through the engine and seed it with a balance.
    pub fn funded_card(&self, owner: &User, balance: Decimal) -> Card {
        let mut card = self
            .ledger
            .create_card(&owner.id, "TEST HOLDER", "12/2030")
            .unwrap();
        card.balance = Balance::new(balance);
        self.store.put_card(&card).unwrap();
        card
    }
}
