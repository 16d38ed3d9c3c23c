//! Dialect parsers for platform disassembler output.
//!
//! Both parsers stream the disassembler's text output line by line,
//! grouping instruction lines under symbol headers and recording each
//! symbol's address range. They share the table schema, the unique-naming
//! policy, and the post-pass that builds the address index and sanitizes
//! every line.

use std::collections::HashMap;
use std::io::{self, BufRead};
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::index::AddressIndex;
use crate::model::{SymbolRecord, SymbolTable};
use crate::rodata::RoDataBuffer;
use crate::sanitize::{self, Dialect, RIP_OPERAND};
use crate::services::tools;

#[derive(Debug, Error)]
pub enum DisasmError {
    #[error("{tool} not found -- exediff needs to be able to run {tool} in order to function. {hint}")]
    MissingTool { tool: String, hint: &'static str },
    #[error("failed to spawn {tool}: {source}")]
    Spawn { tool: String, source: io::Error },
    #[error("error reading disassembler output: {0}")]
    Io(#[from] io::Error),
}

/// Trait implemented by dialect parsers, selected at construction time
/// rather than by compile-time conditional.
///
/// A parser consumes one disassembler text stream and produces a symbol
/// table of raw (not yet sanitized) per-symbol text.
pub trait DialectParser {
    fn parse(&self, reader: &mut dyn BufRead) -> Result<SymbolTable, DisasmError>;
    fn dialect(&self) -> Dialect;
    fn name(&self) -> &'static str;
}

/// Registry for dialect parsers; callers select by name.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: HashMap<String, Box<dyn DialectParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self { parsers: HashMap::new() }
    }

    pub fn register<P: DialectParser + 'static>(&mut self, parser: P) -> &mut Self {
        self.parsers.insert(parser.name().to_string(), Box::new(parser));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn DialectParser> {
        self.parsers.get(name).map(|p| &**p)
    }

    /// The registered parser for a dialect, if any.
    pub fn for_dialect(&self, dialect: Dialect) -> Option<&dyn DialectParser> {
        self.parsers.values().find(|p| p.dialect() == dialect).map(|p| &**p)
    }

    /// Return a sorted list of registered parser names for error messages/help.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.parsers.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Convenience builder for a registry populated with both built-in dialects.
pub fn default_parser_registry() -> ParserRegistry {
    let mut registry = ParserRegistry::new();
    registry.register(OtoolParser);
    registry.register(ObjdumpParser);
    registry
}

/// State for the symbol currently being accumulated; flushed into the table
/// at each symbol-boundary transition.
struct OpenSymbol {
    name: String,
    record: SymbolRecord,
    last_address: u64,
}

impl OpenSymbol {
    fn new(name: &str) -> Self {
        Self { name: name.to_string(), record: SymbolRecord::default(), last_address: 0 }
    }

    fn with_start(name: &str, start_address: u64) -> Self {
        let mut open = Self::new(name);
        open.record.start_address = start_address;
        open
    }
}

fn flush(table: &mut SymbolTable, open: Option<OpenSymbol>) {
    if let Some(open) = open {
        table.insert_unique(&open.name, open.record);
    }
}

/// Parser for the otool disassembler format.
pub struct OtoolParser;

impl OtoolParser {
    fn append_instruction(open: &mut OpenSymbol, line: &str) {
        let mut body = line;
        if let Some(tab) = line.find('\t') {
            let addr = sanitize::parse_hex_prefix(line[..tab].trim());
            if open.record.start_address == 0 {
                open.record.start_address = addr;
            }
            // end of this instruction, approximating its width as 4 bytes
            let span = addr.saturating_sub(open.record.start_address) + 4;
            open.record.length = open.record.length.max(span);
            body = &line[tab + 1..];
        }

        let (pre, comment) = match body.find(" ## ") {
            Some(idx) => (&body[..idx], &body[idx..]),
            None => (body, ""),
        };
        let neutralize = body.contains(RIP_OPERAND)
            || comment.contains(" for: ")
            || comment.contains(" symbol address:")
            || ((body.starts_with("call") || body.starts_with("jmp")) && comment.is_empty());
        let keep_comment = comment.contains("literal");

        let text = &mut open.record.text;
        if neutralize {
            text.push_str(&sanitize::neutralize_addresses(pre, Dialect::Otool));
        } else {
            text.push_str(pre);
        }
        if keep_comment {
            text.push_str(comment);
        }
        text.push('\n');
    }
}

impl DialectParser for OtoolParser {
    fn parse(&self, reader: &mut dyn BufRead) -> Result<SymbolTable, DisasmError> {
        let mut table = SymbolTable::new();
        let mut open: Option<OpenSymbol> = None;
        let mut first = true;
        let mut raw = Vec::new();

        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            if first {
                // the first line is just the name of the executable
                first = false;
                continue;
            }
            let owned = String::from_utf8_lossy(&raw);
            let line = owned.trim();

            if let Some(name) = line.strip_suffix(':') {
                flush(&mut table, open.take());
                open = Some(OpenSymbol::new(name));
            } else if let Some(sym) = open.as_mut() {
                Self::append_instruction(sym, line);
            }
        }
        flush(&mut table, open.take());

        Ok(table)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Otool
    }

    fn name(&self) -> &'static str {
        "otool"
    }
}

/// Parser for the objdump disassembler format.
pub struct ObjdumpParser;

impl ObjdumpParser {
    fn append_instruction(open: &mut OpenSymbol, line: &str) {
        let mut body = line;
        if let Some(tab) = line.find('\t') {
            // the leading column (e.g. "4137ac:") is the instruction
            // address, tracked only to patch the final symbol's length
            open.last_address = sanitize::parse_hex_prefix(line[..tab].trim());
            body = line[tab + 1..].trim();
        }

        let neutralize = body.contains("%rip")
            || body.contains("%rsp")
            || body.ends_with('>')
            || body.starts_with("call")
            || body.starts_with("jmp");

        let text = &mut open.record.text;
        if neutralize {
            text.push_str(&sanitize::neutralize_addresses(body, Dialect::Objdump));
        } else {
            text.push_str(body);
        }
        text.push('\n');
    }

    fn header_name(line: &str) -> &str {
        let after = line.split_once('<').map(|(_, rest)| rest).unwrap_or("");
        after.split_once('>').map(|(name, _)| name).unwrap_or(after)
    }
}

impl DialectParser for ObjdumpParser {
    fn parse(&self, reader: &mut dyn BufRead) -> Result<SymbolTable, DisasmError> {
        let mut table = SymbolTable::new();
        let mut open: Option<OpenSymbol> = None;
        let mut first = true;
        let mut raw = Vec::new();

        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            if first {
                first = false;
                continue;
            }
            let owned = String::from_utf8_lossy(&raw);
            let line = owned.trim();

            if line.ends_with(">:") {
                let addr = sanitize::parse_hex_prefix(line);
                if addr == 0 {
                    continue;
                }
                if let Some(mut prev) = open.take() {
                    // the next symbol's start bounds the previous one
                    let span = addr.saturating_sub(prev.record.start_address);
                    prev.record.length = prev.record.length.max(span);
                    flush(&mut table, Some(prev));
                }
                open = Some(OpenSymbol::with_start(Self::header_name(line), addr));
            } else if let Some(sym) = open.as_mut() {
                Self::append_instruction(sym, line);
            }
        }

        if let Some(mut last) = open.take() {
            // no next header bounds the final symbol; derive its length
            // from the last instruction seen instead of leaving it empty
            if last.last_address > 0 {
                let span = last.last_address.saturating_sub(last.record.start_address) + 4;
                last.record.length = last.record.length.max(span);
            }
            flush(&mut table, Some(last));
        }

        Ok(table)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Objdump
    }

    fn name(&self) -> &'static str {
        "objdump"
    }
}

/// Shared post-pass: build the address index from the parsed table, then
/// rewrite every symbol's text through the line sanitizer. The table is
/// name-ordered afterwards, ready for matching.
pub fn normalize_table(table: &mut SymbolTable, dialect: Dialect, rodata: Option<&RoDataBuffer>) {
    let index = AddressIndex::build(table);
    for (_, record) in table.iter_mut() {
        record.text = sanitize::sanitize_text(&record.text, dialect, &index, rodata);
    }
}

/// Run the full per-file pipeline: disassemble `path`, parse the stream,
/// load RO-data when the dialect calls for it, and sanitize every symbol.
pub fn load_executable(
    parser: &dyn DialectParser,
    path: &Path,
) -> Result<SymbolTable, DisasmError> {
    info!("Opening executable file [{}]...", path.display());

    let mut stream = tools::disassemble_code(parser.dialect(), path)?;
    let mut table = parser.parse(stream.reader())?;
    stream.finish()?;

    let rodata = match parser.dialect() {
        Dialect::Objdump => {
            let mut stream = tools::dump_rodata(path)?;
            let buffer = RoDataBuffer::from_hex_dump(stream.reader())?;
            stream.finish()?;
            Some(buffer)
        }
        Dialect::Otool => None,
    };

    normalize_table(&mut table, parser.dialect(), rodata.as_ref());
    info!("Parsed {} unique symbols from {}", table.len(), path.display());

    Ok(table)
}
