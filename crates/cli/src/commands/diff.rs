use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::info;

use exediff_core::services::disasm::{default_parser_registry, load_executable};
use exediff_core::services::{matcher, report, tools};

use crate::commands::resolve_parser;
use crate::{report_file_name, sha256_file};

/// Compare two executables and write the per-symbol diff report.
pub fn diff_command(
    file_a: &Path,
    file_b: &Path,
    dialect: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    for file in [file_a, file_b] {
        if !file.is_file() {
            return Err(anyhow!("Executable does not exist: {}", file.display()));
        }
    }

    let registry = default_parser_registry();
    let parser = resolve_parser(&registry, dialect)?;

    let mut table_a = load_executable(parser, file_a)?;
    let mut table_b = load_executable(parser, file_b)?;

    // Get rid of everything that didn't change, we're not interested in that
    let pruned = matcher::prune_identical(&mut table_a, &mut table_b);
    info!(
        "Found {} matching symbols and {} non-matching symbols.",
        pruned,
        table_a.len() + table_b.len()
    );

    let report_path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(report_file_name()),
    };
    let file = File::create(&report_path)
        .with_context(|| format!("Failed to create report file: {}", report_path.display()))?;
    let mut out = BufWriter::new(file);

    let name_a = file_a.display().to_string();
    let name_b = file_b.display().to_string();
    writeln!(out, "Comparing [{}] (sha256 {})", name_a, sha256_file(file_a)?)?;
    writeln!(out, "  against [{}] (sha256 {})", name_b, sha256_file(file_b)?)?;

    report::write_report(&mut out, &name_a, &table_a, &name_b, &table_b, &tools::diff_text)?;
    out.flush()?;

    info!("Diffs report written to file [{}]", report_path.display());
    Ok(())
}
