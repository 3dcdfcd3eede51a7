//! ZIP packaging of the compiled artifact.

use std::io::{Cursor, Write};

use anyhow::Result;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Name of the rule dump inside the archive.
pub const RULES_ENTRY: &str = "rules.txt";

/// Build an in-memory ZIP with one deflated entry per `(name, data)` pair.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for (name, data) in entries {
        zip.start_file(*name, options)?;
        zip.write_all(data)?;
    }

    Ok(zip.finish()?.into_inner())
}
