//! Card ledger engine for cardledger.
//!
//! [`CardLedger`] owns every card invariant: status-dependent operation
//! rules, ownership scoping, and atomic two-leg balance transfers with an
//! auditable transaction record. The surrounding (excluded) boundary
//! authenticates callers and validates request shape; the engine still
//! re-validates domain state itself.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cardledger_engine::{CardLedger, EngineConfig};
//! use cardledger_store::{PanCipher, RocksStore};
//!
//! let config = EngineConfig::from_env().expect("configuration");
//! let cipher = PanCipher::from_base64(&config.encryption_key).expect("encryption key");
//! let store = Arc::new(RocksStore::open(&config.data_dir, cipher).expect("store"));
//! let ledger = CardLedger::new(store, &config);
//!
//! # let owner_id = cardledger_core::UserId::generate();
//! let card = ledger.create_card(&owner_id, "JANE DOE", "09/2031").unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod ledger;
pub mod pan;
pub mod query;

pub use config::EngineConfig;
pub use ledger::{CardLedger, TransferRequest};
pub use pan::{PanGenerator, RandomPanGenerator};
pub use query::CardSummary;
