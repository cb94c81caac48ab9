//! Ledger store: sole owner of journal entries, enforcing the
//! debit = credit invariant on every insert and update

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::ledger::{patterns, AccountDirectory, OpeningBalance};
use crate::reports::*;
use crate::traits::*;
use crate::types::*;
use crate::utils::memory_storage::MemoryStorage;

/// Entry collection with invariant-checked mutations
pub struct LedgerStore<S: LedgerStorage = MemoryStorage> {
    storage: S,
    validator: Box<dyn EntryValidator>,
}

impl LedgerStore<MemoryStorage> {
    /// Create a store backed by in-memory storage
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }
}

impl<S: LedgerStorage> LedgerStore<S> {
    /// Create a new store with the given storage backend
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultEntryValidator),
        }
    }

    /// Create a new store with a custom validator
    pub fn with_validator(storage: S, validator: Box<dyn EntryValidator>) -> Self {
        Self { storage, validator }
    }

    /// Validate and store an entry, returning its newly assigned id
    pub fn insert(&mut self, mut entry: JournalEntry) -> LedgerResult<String> {
        if let Err(err) = self.validator.validate_entry(&entry) {
            warn!(date = %entry.date, journal = %entry.journal, error = %err, "entry rejected");
            return Err(err);
        }

        entry.id = Uuid::new_v4().to_string();
        let id = entry.id.clone();
        debug!(id = %id, lines = entry.lines.len(), "inserting entry");
        self.storage.save_entry(entry)?;
        Ok(id)
    }

    /// Validate and replace an existing entry by id
    pub fn update(&mut self, entry: JournalEntry) -> LedgerResult<()> {
        if self.storage.get_entry(&entry.id)?.is_none() {
            return Err(LedgerError::NotFound(entry.id));
        }

        if let Err(err) = self.validator.validate_entry(&entry) {
            warn!(id = %entry.id, error = %err, "update rejected");
            return Err(err);
        }

        debug!(id = %entry.id, "replacing entry");
        self.storage.replace_entry(entry)
    }

    /// Remove an entry; returns whether it existed. Deleting an unknown id is a no-op.
    pub fn delete(&mut self, entry_id: &str) -> LedgerResult<bool> {
        let removed = self.storage.remove_entry(entry_id)?.is_some();
        if removed {
            debug!(id = entry_id, "entry deleted");
        } else {
            debug!(id = entry_id, "delete of unknown entry ignored");
        }
        Ok(removed)
    }

    /// Get an entry by id
    pub fn get(&self, entry_id: &str) -> LedgerResult<Option<&JournalEntry>> {
        self.storage.get_entry(entry_id)
    }

    /// Lazy, restartable view over the entries matching `predicate`
    pub fn query<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a JournalEntry> + Clone + 'a
    where
        P: Fn(&JournalEntry) -> bool + Clone + 'a,
    {
        self.storage
            .entries()
            .iter()
            .filter(move |entry: &&JournalEntry| predicate(*entry))
    }

    /// Read-only snapshot of every entry, in insertion order
    pub fn snapshot(&self) -> &[JournalEntry] {
        self.storage.entries()
    }

    pub fn len(&self) -> usize {
        self.storage.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.entries().is_empty()
    }

    /// Record opening balances as one entry under the opening journal
    pub fn import_opening_balances(
        &mut self,
        date: NaiveDate,
        balances: &[OpeningBalance],
    ) -> LedgerResult<String> {
        let entry = patterns::opening_balance_entry(date, balances)?;
        self.insert(entry)
    }

    /// Trial balance over this store's entries
    pub fn trial_balance(
        &self,
        directory: &AccountDirectory,
        period: Period,
        format: BalanceFormat,
    ) -> TrialBalance {
        BalanceAggregator::new(directory, period, format).compute(self.snapshot())
    }

    /// Chronological statement for one account (or all accounts)
    pub fn account_ledger(&self, filter: AccountFilter, period: Period) -> AccountLedger {
        LedgerProjector::new(filter, period).project(self.snapshot())
    }

    /// Income statement and balance sheet totals
    pub fn financial_statements(
        &self,
        mapper: &FinancialStatementMapper,
        period: Period,
    ) -> FinancialStatements {
        mapper.compute(self.snapshot(), period)
    }
}
