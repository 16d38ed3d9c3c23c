//! Symbol records and the per-file symbol table.

use std::collections::btree_map::{Iter, IterMut};
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One named, address-bounded region of an executable, typically a function.
///
/// Records are mutated by the parser while their symbol is open (text
/// appended, length extended) and become immutable once the file is fully
/// parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    /// Lowest instruction address observed for this symbol.
    pub start_address: u64,
    /// Span from `start_address` past the end of the last instruction.
    pub length: u64,
    /// Accumulated disassembly lines, each terminated by a newline.
    pub text: String,
}

impl SymbolRecord {
    /// True when `addr` falls inside `[start_address, start_address + length)`.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start_address && addr - self.start_address < self.length
    }
}

/// Per-file mapping of unique symbol name to record.
///
/// Key collisions are resolved by suffixing `#<k>`; iteration is always
/// ascending by name, which is the order the matcher and report consume.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    symbols: BTreeMap<String, SymbolRecord>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { symbols: BTreeMap::new() }
    }

    /// Insert `record` under `name`, suffixing `#<k>` on collision.
    ///
    /// Returns the key actually used.
    pub fn insert_unique(&mut self, name: &str, record: SymbolRecord) -> String {
        let key = if self.symbols.contains_key(name) {
            self.next_free_suffix(name)
        } else {
            name.to_string()
        };
        self.symbols.insert(key.clone(), record);
        key
    }

    /// Smallest `name#<k>` not already present.
    ///
    /// Starts from `name#0`; on each collision the trailing digit run of the
    /// candidate is parsed, incremented, and re-appended, so a base name
    /// that itself ends in digits never has those digits touched.
    fn next_free_suffix(&self, name: &str) -> String {
        let mut candidate = format!("{name}#0");
        while self.symbols.contains_key(&candidate) {
            let digits = candidate.chars().rev().take_while(|c| c.is_ascii_digit()).count();
            let split = candidate.len() - digits;
            let k: u64 = candidate[split..].parse().unwrap_or(0);
            candidate.truncate(split);
            candidate.push_str(&(k + 1).to_string());
        }
        candidate
    }

    pub fn get(&self, name: &str) -> Option<&SymbolRecord> {
        self.symbols.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<SymbolRecord> {
        self.symbols.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.symbols.keys()
    }

    /// Entries in ascending-name order.
    pub fn iter(&self) -> Iter<'_, String, SymbolRecord> {
        self.symbols.iter()
    }

    /// Mutable entries, used by the sanitize pass to rewrite symbol text.
    pub fn iter_mut(&mut self) -> IterMut<'_, String, SymbolRecord> {
        self.symbols.iter_mut()
    }
}
