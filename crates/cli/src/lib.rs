use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use sha2::{Digest, Sha256};

pub mod commands;

/// Report file name embedding the current wall-clock time, with
/// path-unsafe characters replaced by underscores.
pub fn report_file_name() -> String {
    let stamp = Local::now().format("%Y/%m/%d %H:%M:%S");
    format!("executable_diffs_report_{stamp}.txt").replace(['/', ':', ' '], "_")
}

/// Compute the SHA-256 hash of a file and return it as a hex string.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open executable for hashing: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("Failed to read executable for hashing: {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    Ok(format!("{:x}", digest))
}
