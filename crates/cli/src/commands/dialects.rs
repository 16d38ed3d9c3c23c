use anyhow::Result;

use exediff_core::services::disasm::default_parser_registry;

/// List registered dialect parsers (human or JSON).
pub fn dialects_command(json: bool) -> Result<()> {
    let registry = default_parser_registry();
    let names = registry.names();

    if json {
        let serialized = serde_json::to_string_pretty(&names)?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Dialects:");
    for name in names {
        println!("- {name}");
    }

    Ok(())
}
