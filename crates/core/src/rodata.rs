//! Read-only-data section buffer and literal-string resolution.

use std::io::{self, BufRead};

/// Banner line preceding the hex dump in the section-dump output.
const SECTION_BANNER: &str = "Contents of section .rodata:";

/// A slot resolved inside the RO-data buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoSlot {
    /// NUL-terminated string literal beginning at the resolved offset.
    Literal(String),
    /// A 4-byte integer stored in an 8-byte field, not a string pointer.
    PackedOffset,
}

/// Contents of the `.rodata` section plus its base address.
///
/// Present only on the objdump path, where the disassembler output carries
/// no literal annotations. Held only for the duration of the normalization
/// pass.
#[derive(Debug, Default)]
pub struct RoDataBuffer {
    base: u64,
    bytes: Vec<u8>,
}

impl RoDataBuffer {
    pub fn new(base: u64, bytes: Vec<u8>) -> Self {
        Self { base, bytes }
    }

    /// Decode the hex dump emitted by the disassembler's section-dump mode.
    ///
    /// Everything before the `Contents of section .rodata:` banner is
    /// ignored. Each data line is `<addr> <word1> <word2> <word3> <word4>`
    /// followed by an ASCII rendering; the first token is the line's base
    /// address and each word is four bytes of hex, decoded two nybbles at a
    /// time. The buffer's base address is the first line address seen.
    pub fn from_hex_dump<R: BufRead>(mut reader: R) -> io::Result<Self> {
        let mut base = 0u64;
        let mut bytes = Vec::new();
        let mut in_section = false;
        let mut raw = Vec::new();

        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            let owned = String::from_utf8_lossy(&raw);
            let line = owned.trim();

            if !in_section {
                in_section = line.starts_with(SECTION_BANNER);
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(addr) = tokens.next() else {
                continue;
            };
            if base == 0 {
                base = crate::sanitize::parse_hex_prefix(addr);
            }

            let mut hex = String::new();
            for word in tokens.take(4) {
                hex.push_str(word);
            }
            for pair in hex.as_bytes().chunks_exact(2) {
                let byte = std::str::from_utf8(pair)
                    .ok()
                    .and_then(|s| u8::from_str_radix(s, 16).ok())
                    .unwrap_or(0);
                bytes.push(byte);
            }
        }

        Ok(Self { base, bytes })
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Resolve `addr` to the literal it points at, when it falls inside
    /// `[base, base + len)`.
    ///
    /// An 8-byte slot whose upper four bytes are all zero is reported as
    /// `PackedOffset` rather than decoded; such slots occur throughout real
    /// `.rodata` sections and are not string pointers.
    pub fn resolve_literal(&self, addr: u64) -> Option<RoSlot> {
        if addr < self.base {
            return None;
        }
        let offset = (addr - self.base) as usize;
        if offset >= self.bytes.len() {
            return None;
        }

        let tail = &self.bytes[offset..];
        if tail.len() >= 8 && tail[4..8].iter().all(|&b| b == 0) {
            return Some(RoSlot::PackedOffset);
        }

        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Some(RoSlot::Literal(String::from_utf8_lossy(&tail[..end]).into_owned()))
    }
}
