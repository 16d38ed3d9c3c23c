//! exediff-core
//!
//! Core library for comparing the disassembly of two builds of the same
//! executable at the function level.
//!
//! The pipeline turns raw disassembler output into a form where an
//! unchanged function compares byte-identical across builds despite
//! different absolute addresses: dialect parsers group instruction lines
//! under symbols, the address index maps addresses back to owning symbols,
//! the RO-data buffer resolves string-literal addresses, and the line
//! sanitizer rewrites what remains. Matching and report emission consume
//! the normalized tables.
//!
//! The goal is to keep all substantive logic here so it is fully testable
//! and reusable from the CLI frontend.

pub mod index;
pub mod model;
pub mod rodata;
pub mod sanitize;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
