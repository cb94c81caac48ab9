//! Ledger module: chart of accounts, entry construction and the ledger store

pub mod account;
pub mod core;
pub mod transaction;

pub use account::*;
pub use self::core::*;
pub use transaction::*;
