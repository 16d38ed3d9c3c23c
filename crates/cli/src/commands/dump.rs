use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use exediff_core::services::disasm::{default_parser_registry, load_executable};

use crate::commands::resolve_parser;

/// Parse and normalize one executable, then print each symbol's name,
/// address range, and sanitized text.
pub fn dump_command(
    file: &Path,
    dialect: Option<&str>,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    if !file.is_file() {
        return Err(anyhow!("Executable does not exist: {}", file.display()));
    }

    let registry = default_parser_registry();
    let parser = resolve_parser(&registry, dialect)?;
    let table = load_executable(parser, file)?;

    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path).with_context(|| {
            format!("Failed to create output file: {}", path.display())
        })?),
        None => Box::new(io::stdout()),
    };

    if json {
        let serialized = serde_json::to_string_pretty(&table)?;
        writeln!(out, "{serialized}")?;
        return Ok(());
    }

    for (name, record) in table.iter() {
        writeln!(
            out,
            "[{}] [{:#x}-{:#x}) (length={})",
            name,
            record.start_address,
            record.start_address + record.length,
            record.length
        )?;
        for line in record.text.lines() {
            writeln!(out, "    {line}")?;
        }
    }

    Ok(())
}
