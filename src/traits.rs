//! Traits for storage abstraction and extensibility

use crate::types::*;

/// Storage abstraction for the ledger store
///
/// The ledger only talks to this trait, so entries can live in memory
/// or in whatever the persistence collaborator provides. Implementations
/// must keep insertion order in [`LedgerStorage::entries`]; statement
/// projections rely on it to break date ties.
pub trait LedgerStorage {
    /// Save a new entry (its id is already assigned)
    fn save_entry(&mut self, entry: JournalEntry) -> LedgerResult<()>;

    /// Get an entry by ID
    fn get_entry(&self, entry_id: &str) -> LedgerResult<Option<&JournalEntry>>;

    /// Replace an existing entry, keeping its position
    fn replace_entry(&mut self, entry: JournalEntry) -> LedgerResult<()>;

    /// Remove an entry, returning it if it existed
    fn remove_entry(&mut self, entry_id: &str) -> LedgerResult<Option<JournalEntry>>;

    /// All stored entries, in insertion order
    fn entries(&self) -> &[JournalEntry];
}

/// Trait for implementing custom entry validation rules
pub trait EntryValidator {
    /// Validate an entry before it is stored
    fn validate_entry(&self, entry: &JournalEntry) -> LedgerResult<()>;
}

/// Default validator: line shape, then the debit = credit invariant
pub struct DefaultEntryValidator;

impl EntryValidator for DefaultEntryValidator {
    fn validate_entry(&self, entry: &JournalEntry) -> LedgerResult<()> {
        entry.validate()
    }
}
