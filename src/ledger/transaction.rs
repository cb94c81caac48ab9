//! Journal entry construction

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Builder for creating multi-line journal entries
#[derive(Debug)]
pub struct JournalEntryBuilder {
    entry: JournalEntry,
}

impl JournalEntryBuilder {
    /// Create a new entry builder
    pub fn new(date: NaiveDate, journal: JournalCode) -> Self {
        Self {
            entry: JournalEntry::new(date, journal),
        }
    }

    /// Set the piece number
    pub fn piece(mut self, piece: impl Into<String>) -> Self {
        self.entry.piece = Some(piece.into());
        self
    }

    /// Set the external reference
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.entry.reference = Some(reference.into());
        self
    }

    /// Add a debit line
    pub fn debit(
        mut self,
        account_code: impl Into<AccountCode>,
        label: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        self.entry
            .add_line(EntryLine::debit(account_code, label, amount));
        self
    }

    /// Add a credit line
    pub fn credit(
        mut self,
        account_code: impl Into<AccountCode>,
        label: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        self.entry
            .add_line(EntryLine::credit(account_code, label, amount));
        self
    }

    /// Add a custom line
    pub fn line(mut self, line: EntryLine) -> Self {
        self.entry.add_line(line);
        self
    }

    /// Build the entry, checking shape and balance
    pub fn build(self) -> LedgerResult<JournalEntry> {
        self.entry.validate()?;
        Ok(self.entry)
    }
}

/// One `(account, debit, credit)` opening position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningBalance {
    pub account_code: AccountCode,
    pub debit: BigDecimal,
    pub credit: BigDecimal,
}

impl OpeningBalance {
    pub fn new(account_code: impl Into<AccountCode>, debit: BigDecimal, credit: BigDecimal) -> Self {
        Self {
            account_code: account_code.into(),
            debit,
            credit,
        }
    }
}

/// Common entry patterns
pub mod patterns {
    use super::*;

    /// Opening-balance import: one ordinary entry under the reserved
    /// opening journal, dated before the period it opens
    pub fn opening_balance_entry(
        date: NaiveDate,
        balances: &[OpeningBalance],
    ) -> LedgerResult<JournalEntry> {
        let zero = BigDecimal::from(0);
        balances
            .iter()
            .filter(|b| b.debit != zero || b.credit != zero)
            .fold(
                JournalEntryBuilder::new(date, JournalCode::Opening).piece("RAN"),
                |builder, b| {
                    builder.line(EntryLine::new(
                        b.account_code.clone(),
                        "Report à nouveau",
                        b.debit.clone(),
                        b.credit.clone(),
                    ))
                },
            )
            .build()
    }

    /// Sale on credit: debit receivable (TTC), credit VAT collected, credit revenue
    pub fn sale_with_vat(
        date: NaiveDate,
        receivable: &str,
        vat_collected: &str,
        revenue: &str,
        base: BigDecimal,
        vat: BigDecimal,
    ) -> LedgerResult<JournalEntry> {
        let total = &base + &vat;
        let mut builder = JournalEntryBuilder::new(date, JournalCode::Sales)
            .debit(receivable, "Client", total);
        if vat > BigDecimal::from(0) {
            builder = builder.credit(vat_collected, "TVA collectée", vat);
        }
        builder.credit(revenue, "Vente", base).build()
    }

    /// Purchase on credit: debit expense, debit deductible VAT, credit payable (TTC)
    pub fn purchase_with_vat(
        date: NaiveDate,
        expense: &str,
        vat_deductible: &str,
        payable: &str,
        base: BigDecimal,
        vat: BigDecimal,
    ) -> LedgerResult<JournalEntry> {
        let total = &base + &vat;
        let mut builder = JournalEntryBuilder::new(date, JournalCode::Purchases)
            .debit(expense, "Achat", base);
        if vat > BigDecimal::from(0) {
            builder = builder.debit(vat_deductible, "TVA déductible", vat);
        }
        builder.credit(payable, "Fournisseur", total).build()
    }

    /// Settlement of a supplier through the bank
    pub fn supplier_payment(
        date: NaiveDate,
        payable: &str,
        bank: &str,
        amount: BigDecimal,
    ) -> LedgerResult<JournalEntry> {
        JournalEntryBuilder::new(date, JournalCode::Bank)
            .debit(payable, "Règlement fournisseur", amount.clone())
            .credit(bank, "Banque", amount)
            .build()
    }

    /// Collection from a customer through the bank
    pub fn customer_receipt(
        date: NaiveDate,
        bank: &str,
        receivable: &str,
        amount: BigDecimal,
    ) -> LedgerResult<JournalEntry> {
        JournalEntryBuilder::new(date, JournalCode::Bank)
            .debit(bank, "Banque", amount.clone())
            .credit(receivable, "Règlement client", amount)
            .build()
    }
}
