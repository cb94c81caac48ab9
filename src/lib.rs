//! # Compta Core
//!
//! Double-entry bookkeeping for the SYSCOHADA chart of accounts, with
//! document inference, VAT calculation and accounting reports.
//!
//! ## Features
//!
//! - **Journal entries**: balanced entries validated on every write, stored behind a storage trait
//! - **Chart of accounts**: SYSCOHADA classes 1-8 with user-defined sub-accounts
//! - **Document inference**: metadata extraction, operation classification and entry proposals from invoice text
//! - **VAT**: forward and reverse TVA calculation rounded half-up to the cent
//! - **Reports**: 2/4/6-column trial balance, account ledger, income statement and balance sheet
//!
//! ## Quick Start
//!
//! ```rust
//! use compta_core::{patterns, AccountDirectory, BalanceFormat, LedgerStore, Period};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let mut store = LedgerStore::in_memory();
//! let sale = patterns::sale_with_vat(
//!     date,
//!     "411",
//!     "4431",
//!     "701",
//!     BigDecimal::from(100000),
//!     BigDecimal::from(18000),
//! )
//! .unwrap();
//! store.insert(sale).unwrap();
//!
//! let period = Period::new(date, date).unwrap();
//! let balance = store.trial_balance(&AccountDirectory::syscohada(), period, BalanceFormat::TwoColumns);
//! assert!(balance.totals.is_balanced());
//! ```

pub mod config;
pub mod inference;
pub mod ledger;
pub mod reports;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{DefaultAccounts, EngineConfig, ReportSettings, Settings};
pub use inference::{DocumentInferenceEngine, InferenceOutcome, OperationType};
pub use ledger::*;
pub use reports::*;
pub use tax::*;
pub use traits::*;
pub use types::*;

// Re-export entry patterns for convenience
pub use ledger::transaction::patterns;
