//! Line-level normalization: address neutralization and expansion.
//!
//! Two rewrites run over disassembly lines. At parse time, lines whose
//! addresses cannot meaningfully be resolved (instruction-pointer-relative
//! operands, call/jump targets the disassembler already annotated) are
//! *neutralized*: hex constants collapse to `0x?`. After the whole file is
//! parsed, every line is *sanitized*: absolute addresses are expanded into
//! symbol names or string literals via the address index and RO-data
//! buffer, so that unchanged functions compare equal across builds.

use crate::index::AddressIndex;
use crate::rodata::{RoDataBuffer, RoSlot};

/// Instruction-pointer-relative operand marker.
pub const RIP_OPERAND: &str = "(%rip)";

/// The two recognized disassembler output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Otool,
    Objdump,
}

impl Dialect {
    /// Dialect of the host platform's disassembler.
    pub fn host_default() -> Self {
        if cfg!(target_os = "macos") {
            Dialect::Otool
        } else {
            Dialect::Objdump
        }
    }
}

/// Outcome of resolving one absolute address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The address points at a string literal in the RO-data section.
    Literal(String),
    /// The address falls inside a known symbol's extent.
    Symbol(String),
    /// Neither source knows the address; it is left untouched.
    Unresolved,
}

/// Resolve `addr` against the RO-data buffer first, then the symbol index.
pub fn resolve_address(
    addr: u64,
    index: &AddressIndex,
    rodata: Option<&RoDataBuffer>,
) -> Resolution {
    if let Some(slot) = rodata.and_then(|ro| ro.resolve_literal(addr)) {
        return match slot {
            RoSlot::Literal(text) => Resolution::Literal(format!("{{{text}}}")),
            RoSlot::PackedOffset => Resolution::Literal("{(offset)}".to_string()),
        };
    }
    match index.lookup(addr) {
        Some(name) => Resolution::Symbol(name.to_string()),
        None => Resolution::Unresolved,
    }
}

fn hex_run_len(s: &[u8]) -> usize {
    s.iter().take_while(|b| b.is_ascii_hexdigit()).count()
}

/// True when the text at the inspection point reads as a pointer or offset:
/// at least 4 hex digits, or a (possibly empty) hex run followed by `(%r`,
/// which catches instruction-pointer-relative operands like `0x5(%rip)`.
fn is_pointer_or_offset(s: &[u8]) -> bool {
    let run = hex_run_len(s);
    run >= 4 || s[run..].starts_with(b"(%r")
}

/// Parse the leading hexadecimal digits of `s` (after an optional `0x`),
/// ignoring everything that follows. Returns 0 when there are none.
pub fn parse_hex_prefix(s: &str) -> u64 {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let end = hex_run_len(s.as_bytes());
    u64::from_str_radix(&s[..end], 16).unwrap_or(0)
}

/// Collapse hex constants that read as pointers or offsets down to `0x?`.
///
/// The trigger is `0x` followed by a pointer-or-offset; the objdump dialect
/// additionally triggers on `# ` (the operand-comment form). Once
/// triggered, the entire hex run is consumed.
pub fn neutralize_addresses(line: &str, dialect: Dialect) -> String {
    let bytes = line.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len() + 8);
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];
        let triggered = rest.len() >= 2
            && ((rest[0] == b'0' && rest[1] == b'x' && is_pointer_or_offset(&rest[2..]))
                || (dialect == Dialect::Objdump
                    && rest[0] == b'#'
                    && rest[1] == b' '
                    && is_pointer_or_offset(&rest[2..])));
        if triggered {
            out.extend_from_slice(b"0x?");
            i += 2;
            while i < bytes.len() && bytes[i].is_ascii_hexdigit() {
                i += 1;
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Width of the address-token prefix at the start of `rest`, if one starts
/// here: `0x` in both dialects, plus objdump's space-then-hex operand form
/// (where a ` 0x` prefix spans three bytes).
fn address_token_prefix(rest: &[u8], dialect: Dialect) -> Option<usize> {
    if rest.starts_with(b"0x") {
        return Some(2);
    }
    if dialect == Dialect::Objdump && rest.len() >= 2 && rest[0] == b' ' {
        if rest[1..].starts_with(b"0x") {
            return Some(3);
        }
        if rest[1].is_ascii_hexdigit() {
            return Some(1);
        }
    }
    None
}

/// Rewrite one disassembly line, expanding absolute addresses into
/// symbol-relative or literal form.
///
/// Negative offsets (`-0x…`) are never expandable and pass through. An
/// address that neither the RO-data buffer nor the index resolves is left
/// as-is; it is probably a numeric constant. Embedded newlines are escaped
/// so the external diff sees one logical line per line, and a trailing
/// `<name+0x…>` reference is truncated to `<name>`.
pub fn sanitize_line(
    line: &str,
    dialect: Dialect,
    index: &AddressIndex,
    rodata: Option<&RoDataBuffer>,
) -> String {
    let bytes = line.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];
        if rest.starts_with(b"-0x") {
            out.extend_from_slice(b"-0x");
            i += 3;
            continue;
        }

        let Some(prefix) = address_token_prefix(rest, dialect) else {
            out.push(bytes[i]);
            i += 1;
            continue;
        };

        let digits = &rest[prefix..];
        let run = hex_run_len(digits);
        let addr = parse_hex_prefix(std::str::from_utf8(&digits[..run]).unwrap_or(""));
        match resolve_address(addr, index, rodata) {
            Resolution::Literal(text) | Resolution::Symbol(text) => {
                out.extend_from_slice(text.as_bytes());
                i += prefix + run;
            }
            Resolution::Unresolved => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }

    let mut ret = String::from_utf8_lossy(&out).into_owned();
    ret = ret.replace('\n', "\\n");

    if ret.ends_with('>') {
        // Collapse trailing references like "<main+0x9b6>" down to "<main>"
        if let (Some(ob), Some(pb)) = (ret.rfind('<'), ret.rfind('+')) {
            if pb > ob {
                ret.truncate(pb);
                ret.push('>');
            }
        }
    }

    ret
}

/// Sanitize every line of a symbol's accumulated text.
pub fn sanitize_text(
    text: &str,
    dialect: Dialect,
    index: &AddressIndex,
    rodata: Option<&RoDataBuffer>,
) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        out.push_str(&sanitize_line(line, dialect, index, rodata));
        out.push('\n');
    }
    out
}
