//! Report emission for differing and unmatched symbols.

use std::io::{self, Write};

use log::warn;

use crate::model::SymbolTable;
use crate::services::matcher::{classify_remainder, SymbolDiff};

/// Write the full report to `out` in ascending-name order.
///
/// `differ` supplies the line-diff of two sanitized text blobs; in
/// production it wraps the external `diff` tool, and tests inject a
/// closure.
pub fn write_report<W: Write>(
    out: &mut W,
    file_a: &str,
    table_a: &SymbolTable,
    file_b: &str,
    table_b: &SymbolTable,
    differ: &dyn Fn(&str, &str) -> String,
) -> io::Result<()> {
    for diff in classify_remainder(file_a, table_a, file_b, table_b) {
        match diff {
            SymbolDiff::Differing { name } => {
                warn!("Diffs detected in symbol [{name}]");
                let text_a = table_a.get(&name).map(|r| r.text.as_str()).unwrap_or("");
                let text_b = table_b.get(&name).map(|r| r.text.as_str()).unwrap_or("");
                write!(out, "\n\n===================== Diffs for [{name}]:\n")?;
                writeln!(out, "{}", differ(text_a, text_b))?;
            }
            SymbolDiff::OnlyInOne { name, in_file, missing_from } => {
                warn!("Symbol [{name}] exists in [{in_file}] but is not present in [{missing_from}]");
                writeln!(
                    out,
                    "Symbol [{name}] exists in [{in_file}] but is not present in [{missing_from}]"
                )?;
            }
        }
    }
    Ok(())
}
