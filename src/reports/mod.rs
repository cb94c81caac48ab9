//! Reporting over ledger snapshots: trial balance, account ledger and
//! financial statements. Every report is a pure function of the entries
//! it is given.

pub mod account_ledger;
pub mod statements;
pub mod trial_balance;

pub use account_ledger::*;
pub use statements::*;
pub use trial_balance::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Inclusive date range `[from, to]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Where a date falls relative to a period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodPosition {
    Before,
    Within,
    After,
}

impl Period {
    pub fn new(from: NaiveDate, to: NaiveDate) -> LedgerResult<Self> {
        if from > to {
            return Err(LedgerError::Validation(format!(
                "Period start {} is after its end {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    pub fn position(&self, date: NaiveDate) -> PeriodPosition {
        if date < self.from {
            PeriodPosition::Before
        } else if date > self.to {
            PeriodPosition::After
        } else {
            PeriodPosition::Within
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.position(date) == PeriodPosition::Within
    }
}

/// Which accounts a projection covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountFilter {
    All,
    Exact(AccountCode),
}

impl AccountFilter {
    pub fn matches(&self, code: &AccountCode) -> bool {
        match self {
            AccountFilter::All => true,
            AccountFilter::Exact(expected) => expected == code,
        }
    }
}
