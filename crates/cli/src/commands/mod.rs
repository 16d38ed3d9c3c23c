pub mod dialects;
pub mod diff;
pub mod dump;

pub use dialects::*;
pub use diff::*;
pub use dump::*;

use anyhow::{anyhow, Result};
use exediff_core::sanitize::Dialect;
use exediff_core::services::disasm::{DialectParser, ParserRegistry};

/// Resolve the requested dialect parser from the registry, defaulting to
/// the host platform's dialect when none is named.
pub(crate) fn resolve_parser<'r>(
    registry: &'r ParserRegistry,
    requested: Option<&str>,
) -> Result<&'r dyn DialectParser> {
    match requested {
        Some(name) => registry.get(name).ok_or_else(|| {
            anyhow!("Unknown dialect: {} (known: {})", name, registry.names().join(", "))
        }),
        None => registry
            .for_dialect(Dialect::host_default())
            .ok_or_else(|| anyhow!("No parser registered for the host platform")),
    }
}
