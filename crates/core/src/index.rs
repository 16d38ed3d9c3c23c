//! Address-to-symbol lookup over the parsed table.

use crate::model::{SymbolRecord, SymbolTable};

#[derive(Debug, Clone)]
struct IndexEntry {
    name: String,
    start: u64,
    length: u64,
}

/// Ordered sequence of `(name, start, length)` triples supporting
/// binary-search lookup from an instruction address to the owning symbol.
///
/// Entries own copies of the symbol names, so the index never borrows from
/// the table it was built from. Built once per file after parsing; no
/// reordering afterwards.
#[derive(Debug, Default)]
pub struct AddressIndex {
    entries: Vec<IndexEntry>,
}

impl AddressIndex {
    /// Build the index from a parsed table, sorted ascending by start
    /// address with symbol text as tie-breaker.
    pub fn build(table: &SymbolTable) -> Self {
        let mut records: Vec<(&String, &SymbolRecord)> = table.iter().collect();
        records.sort_by(|a, b| {
            a.1.start_address
                .cmp(&b.1.start_address)
                .then_with(|| a.1.text.cmp(&b.1.text))
        });

        let entries = records
            .into_iter()
            .map(|(name, record)| IndexEntry {
                name: name.clone(),
                start: record.start_address,
                length: record.length,
            })
            .collect();
        Self { entries }
    }

    /// Name of the unique entry whose half-open interval
    /// `[start, start + length)` contains `addr`, if any.
    pub fn lookup(&self, addr: u64) -> Option<&str> {
        self.lookup_range(addr, 0, self.entries.len())
    }

    fn lookup_range(&self, addr: u64, first: usize, after_last: usize) -> Option<&str> {
        if first >= after_last {
            return None;
        }
        if first + 1 == after_last {
            // single-entry case; either we have it or we don't
            let entry = &self.entries[first];
            if addr >= entry.start && addr - entry.start < entry.length {
                return Some(&entry.name);
            }
            return None;
        }
        let mid = (first + after_last) / 2;
        if addr < self.entries[mid].start {
            self.lookup_range(addr, first, mid)
        } else {
            self.lookup_range(addr, mid, after_last)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
