//! Core types and data structures for the accounting system

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Accounting nature of an account, derived from its class digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountNature {
    /// Assets - fixed assets, inventory, cash
    Asset,
    /// Liabilities - third parties owed by the business
    Liability,
    /// Equity - capital, reserves and long-term resources
    Equity,
    /// Revenue - sales and other income
    Revenue,
    /// Expenses - purchases, services, personnel costs
    Expense,
}

impl AccountNature {
    /// Returns the normal balance side for this nature
    /// Assets and Expenses normally have debit balances
    /// Liabilities, Equity, and Revenue normally have credit balances
    pub fn normal_balance(&self) -> EntryType {
        match self {
            AccountNature::Asset | AccountNature::Expense => EntryType::Debit,
            AccountNature::Liability | AccountNature::Equity | AccountNature::Revenue => {
                EntryType::Credit
            }
        }
    }
}

/// Sides of a double-entry line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    /// Debit side
    Debit,
    /// Credit side
    Credit,
}

/// Hierarchical numeric account code (e.g. `4111`), the first digit is the class.
///
/// Codes order by class, then by length, then lexicographically: within a
/// class every 2-digit code sorts before any 3-digit code (`60` < `61` < `601`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountCode(String);

impl AccountCode {
    /// Create a code, trimming surrounding whitespace
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self(code.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Account class: the leading digit, if any
    pub fn class(&self) -> Option<u8> {
        self.0
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .map(|d| d as u8)
    }

    /// Nature implied by the class digit
    ///
    /// Class 8 (non-ordinary activities) alternates by sub-class:
    /// odd sub-classes are charges, even ones are products.
    pub fn nature(&self) -> Option<AccountNature> {
        match self.class()? {
            1 => Some(AccountNature::Equity),
            2 | 3 | 5 => Some(AccountNature::Asset),
            4 => Some(AccountNature::Liability),
            6 => Some(AccountNature::Expense),
            7 => Some(AccountNature::Revenue),
            8 => {
                let sub = self.0.chars().nth(1).and_then(|c| c.to_digit(10))?;
                if sub % 2 == 1 {
                    Some(AccountNature::Expense)
                } else {
                    Some(AccountNature::Revenue)
                }
            }
            _ => None,
        }
    }

    /// True when `self` is `other` or one of its sub-accounts
    pub fn starts_with(&self, other: &AccountCode) -> bool {
        self.0.starts_with(other.as_str())
    }

    fn sort_key(&self) -> (u8, usize, &str) {
        (self.class().unwrap_or(10), self.0.len(), self.0.as_str())
    }
}

impl Ord for AccountCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for AccountCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AccountCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for AccountCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for AccountCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

/// Book of origin for a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalCode {
    Purchases,
    Sales,
    Bank,
    Miscellaneous,
    Payroll,
    Cash,
    EMoney,
    /// Reserved for opening-balance import (à-nouveaux)
    Opening,
}

impl JournalCode {
    /// Short code printed on statements
    pub fn code(&self) -> &'static str {
        match self {
            JournalCode::Purchases => "ACH",
            JournalCode::Sales => "VTE",
            JournalCode::Bank => "BQ",
            JournalCode::Miscellaneous => "OD",
            JournalCode::Payroll => "PAIE",
            JournalCode::Cash => "CAI",
            JournalCode::EMoney => "MM",
            JournalCode::Opening => "RAN",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_uppercase();
        [
            JournalCode::Purchases,
            JournalCode::Sales,
            JournalCode::Bank,
            JournalCode::Miscellaneous,
            JournalCode::Payroll,
            JournalCode::Cash,
            JournalCode::EMoney,
            JournalCode::Opening,
        ]
        .into_iter()
        .find(|j| j.code() == code)
    }
}

impl fmt::Display for JournalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Kind of book, used to group journals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalKind {
    Purchases,
    Sales,
    Treasury,
    General,
    Payroll,
    Opening,
}

/// A journal: code + label + kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub code: JournalCode,
    pub label: String,
    pub kind: JournalKind,
}

impl Journal {
    pub fn new(code: JournalCode, label: impl Into<String>, kind: JournalKind) -> Self {
        Self {
            code,
            label: label.into(),
            kind,
        }
    }

    /// Standard set of journals for a small business
    pub fn defaults() -> Vec<Journal> {
        vec![
            Journal::new(JournalCode::Purchases, "Journal des achats", JournalKind::Purchases),
            Journal::new(JournalCode::Sales, "Journal des ventes", JournalKind::Sales),
            Journal::new(JournalCode::Bank, "Journal de banque", JournalKind::Treasury),
            Journal::new(JournalCode::Cash, "Journal de caisse", JournalKind::Treasury),
            Journal::new(JournalCode::EMoney, "Journal mobile money", JournalKind::Treasury),
            Journal::new(JournalCode::Payroll, "Journal de paie", JournalKind::Payroll),
            Journal::new(
                JournalCode::Miscellaneous,
                "Opérations diverses",
                JournalKind::General,
            ),
            Journal::new(JournalCode::Opening, "Reports à nouveau", JournalKind::Opening),
        ]
    }
}

/// Individual line within a journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryLine {
    /// Account being affected
    pub account_code: AccountCode,
    /// Line label
    pub label: String,
    /// Debit amount, never negative
    pub debit: BigDecimal,
    /// Credit amount, never negative
    pub credit: BigDecimal,
    /// Optional customer/supplier reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub third_party: Option<String>,
}

impl EntryLine {
    pub fn new(
        account_code: impl Into<AccountCode>,
        label: impl Into<String>,
        debit: BigDecimal,
        credit: BigDecimal,
    ) -> Self {
        Self {
            account_code: account_code.into(),
            label: label.into(),
            debit,
            credit,
            third_party: None,
        }
    }

    /// Create a debit line
    pub fn debit(
        account_code: impl Into<AccountCode>,
        label: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self::new(account_code, label, amount, BigDecimal::from(0))
    }

    /// Create a credit line
    pub fn credit(
        account_code: impl Into<AccountCode>,
        label: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self::new(account_code, label, BigDecimal::from(0), amount)
    }

    pub fn with_third_party(mut self, third_party: impl Into<String>) -> Self {
        self.third_party = Some(third_party.into());
        self
    }

    /// Signed net of the line: debit - credit
    pub fn net(&self) -> BigDecimal {
        &self.debit - &self.credit
    }
}

/// A dated, balanced set of lines recorded under a journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Opaque identifier, assigned by the ledger store on insert
    pub id: String,
    /// Date when the operation occurred
    pub date: NaiveDate,
    /// Book of origin
    pub journal: JournalCode,
    /// Piece number (supporting document)
    pub piece: Option<String>,
    /// External reference (invoice number, cheque number, ...)
    pub reference: Option<String>,
    /// Ordered lines
    pub lines: Vec<EntryLine>,
}

impl JournalEntry {
    /// Create an entry with no lines and no id
    pub fn new(date: NaiveDate, journal: JournalCode) -> Self {
        Self {
            id: String::new(),
            date,
            journal,
            piece: None,
            reference: None,
            lines: Vec::new(),
        }
    }

    pub fn add_line(&mut self, line: EntryLine) {
        self.lines.push(line);
    }

    pub fn total_debit(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.debit).sum()
    }

    pub fn total_credit(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.credit).sum()
    }

    /// Signed difference Σdebit - Σcredit
    pub fn imbalance(&self) -> BigDecimal {
        self.total_debit() - self.total_credit()
    }

    /// Check if the entry is balanced within the one-cent tolerance
    pub fn is_balanced(&self) -> bool {
        self.imbalance().abs() <= balance_tolerance()
    }

    /// Validate the line shape then the debit = credit invariant
    pub fn validate(&self) -> LedgerResult<()> {
        if self.lines.is_empty() {
            return Err(LedgerError::InvalidEntry(
                "Entry must have at least one line".to_string(),
            ));
        }

        let zero = BigDecimal::from(0);
        for (index, line) in self.lines.iter().enumerate() {
            if line.account_code.is_empty() {
                return Err(LedgerError::InvalidEntry(format!(
                    "Line {} has no account code",
                    index + 1
                )));
            }
            if line.debit < zero || line.credit < zero {
                return Err(LedgerError::InvalidEntry(format!(
                    "Line {} on account {} has a negative amount",
                    index + 1,
                    line.account_code
                )));
            }
        }

        if !self.is_balanced() {
            return Err(LedgerError::InvariantViolation {
                debit: self.total_debit(),
                credit: self.total_credit(),
                delta: self.imbalance(),
            });
        }

        Ok(())
    }
}

/// Maximum accepted |Σdebit - Σcredit|: one cent
pub fn balance_tolerance() -> BigDecimal {
    BigDecimal::from(1) / BigDecimal::from(100)
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),
    #[error("Entry is not balanced: debit = {debit}, credit = {credit}, delta = {delta}")]
    InvariantViolation {
        debit: BigDecimal,
        credit: BigDecimal,
        delta: BigDecimal,
    },
    #[error("Entry not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
