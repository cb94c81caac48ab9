//! Validation utilities

use crate::traits::*;
use crate::types::*;
use crate::ledger::AccountDirectory;

/// Validate that an account code is usable on an entry line
pub fn validate_account_code(code: &AccountCode) -> LedgerResult<()> {
    if code.is_empty() {
        return Err(LedgerError::InvalidEntry(
            "Account code cannot be empty".to_string(),
        ));
    }

    if code.as_str().len() > 20 {
        return Err(LedgerError::InvalidEntry(format!(
            "Account code '{}' cannot exceed 20 characters",
            code
        )));
    }

    if !code.as_str().chars().all(|c| c.is_ascii_digit()) {
        return Err(LedgerError::InvalidEntry(format!(
            "Account code '{}' can only contain digits",
            code
        )));
    }

    Ok(())
}

/// Validate an account label
pub fn validate_account_label(label: &str) -> LedgerResult<()> {
    if label.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account label cannot be empty".to_string(),
        ));
    }

    if label.len() > 100 {
        return Err(LedgerError::Validation(
            "Account label cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Stricter validator: numeric codes only, every account known to the
/// directory, and no line carrying both a debit and a credit.
pub struct ChartEntryValidator {
    directory: AccountDirectory,
}

impl ChartEntryValidator {
    pub fn new(directory: AccountDirectory) -> Self {
        Self { directory }
    }
}

impl EntryValidator for ChartEntryValidator {
    fn validate_entry(&self, entry: &JournalEntry) -> LedgerResult<()> {
        for line in &entry.lines {
            validate_account_code(&line.account_code)?;

            if !self.directory.is_known(&line.account_code) {
                return Err(LedgerError::InvalidEntry(format!(
                    "Account '{}' is not in the chart of accounts",
                    line.account_code
                )));
            }

            let zero = bigdecimal::BigDecimal::from(0);
            if line.debit > zero && line.credit > zero {
                return Err(LedgerError::InvalidEntry(format!(
                    "Line on account '{}' has both a debit and a credit",
                    line.account_code
                )));
            }
        }

        // Shape first, invariant last
        entry.validate()
    }
}
