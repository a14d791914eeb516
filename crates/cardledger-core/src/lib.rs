//! Core types for the cardledger card ledger.
//!
//! This crate provides the foundational types used throughout cardledger:
//!
//! - **Identifiers**: [`UserId`], [`CardId`], [`TransactionId`]
//! - **Money**: [`Balance`], [`Amount`] — exact fixed-point, two fractional digits
//! - **Cards**: [`Card`], [`CardStatus`], [`CardFilter`]
//! - **Transactions**: [`Transaction`], [`TransactionStatus`]
//! - **Users**: [`User`] — the slice of the user directory the ledger needs
//! - **Pagination**: [`PageRequest`], [`Page`]
//!
//! Balances and transfer amounts are `rust_decimal::Decimal` under the hood;
//! floating point is never used for money.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod card;
pub mod error;
pub mod ids;
pub mod money;
pub mod page;
pub mod transaction;
pub mod user;

pub use card::{Card, CardFilter, CardStatus};
pub use error::{LedgerError, Result};
pub use ids::{CardId, IdError, TransactionId, UserId};
pub use money::{Amount, Balance};
pub use page::{Page, PageRequest, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use transaction::{Transaction, TransactionStatus};
pub use user::User;
