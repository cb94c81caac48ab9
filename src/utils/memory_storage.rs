//! In-memory storage implementation

use crate::traits::*;
use crate::types::*;

/// In-memory storage keeping entries in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Vec<JournalEntry>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, entry_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == entry_id)
    }
}

impl LedgerStorage for MemoryStorage {
    fn save_entry(&mut self, entry: JournalEntry) -> LedgerResult<()> {
        if self.position(&entry.id).is_some() {
            return Err(LedgerError::Storage(format!(
                "Entry '{}' already exists",
                entry.id
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    fn get_entry(&self, entry_id: &str) -> LedgerResult<Option<&JournalEntry>> {
        Ok(self.entries.iter().find(|e| e.id == entry_id))
    }

    fn replace_entry(&mut self, entry: JournalEntry) -> LedgerResult<()> {
        match self.position(&entry.id) {
            Some(index) => {
                self.entries[index] = entry;
                Ok(())
            }
            None => Err(LedgerError::NotFound(entry.id)),
        }
    }

    fn remove_entry(&mut self, entry_id: &str) -> LedgerResult<Option<JournalEntry>> {
        Ok(self
            .position(entry_id)
            .map(|index| self.entries.remove(index)))
    }

    fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }
}
