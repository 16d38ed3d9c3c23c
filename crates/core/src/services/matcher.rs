//! Symbol matching across two normalized tables.

use std::collections::HashSet;

use crate::model::SymbolTable;

/// One reportable outcome for a symbol that survived pruning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolDiff {
    /// Same name in both tables, different sanitized text.
    Differing { name: String },
    /// Present in `in_file`, absent from `missing_from`.
    OnlyInOne { name: String, in_file: String, missing_from: String },
}

/// Remove from both tables every symbol whose name and sanitized text are
/// identical across them. Returns the number of symbols pruned.
pub fn prune_identical(table_a: &mut SymbolTable, table_b: &mut SymbolTable) -> usize {
    prune_one_direction(table_a, table_b) + prune_one_direction(table_b, table_a)
}

fn prune_one_direction(table_a: &mut SymbolTable, table_b: &mut SymbolTable) -> usize {
    let names: Vec<String> = table_a.names().cloned().collect();
    let mut pruned = 0;
    for name in names {
        let identical = match (table_a.get(&name), table_b.get(&name)) {
            (Some(record_a), Some(record_b)) => record_a.text == record_b.text,
            _ => false,
        };
        if identical {
            table_a.remove(&name);
            table_b.remove(&name);
            pruned += 1;
        }
    }
    pruned
}

/// Classify every surviving symbol, walking both tables in ascending-name
/// order. A shared `reported` set guarantees each name is emitted once even
/// when both tables still hold it.
pub fn classify_remainder(
    file_a: &str,
    table_a: &SymbolTable,
    file_b: &str,
    table_b: &SymbolTable,
) -> Vec<SymbolDiff> {
    let mut reported = HashSet::new();
    let mut diffs = Vec::new();
    classify_one_direction(file_a, table_a, file_b, table_b, &mut reported, &mut diffs);
    classify_one_direction(file_b, table_b, file_a, table_a, &mut reported, &mut diffs);
    diffs
}

fn classify_one_direction(
    file_a: &str,
    table_a: &SymbolTable,
    file_b: &str,
    table_b: &SymbolTable,
    reported: &mut HashSet<String>,
    diffs: &mut Vec<SymbolDiff>,
) {
    for name in table_a.names() {
        if !reported.insert(name.clone()) {
            continue;
        }
        if table_b.contains(name) {
            diffs.push(SymbolDiff::Differing { name: name.clone() });
        } else {
            diffs.push(SymbolDiff::OnlyInOne {
                name: name.clone(),
                in_file: file_a.to_string(),
                missing_from: file_b.to_string(),
            });
        }
    }
}
