//! `convert` command.

use std::io::Write;

use anyhow::{Context, Result};
use hunter_rules::persist::write_atomic;
use hunter_rules::RecmdConverter;
use tracing::info;

use crate::cli::ConvertArgs;

/// Convert the batch files, write the rule file and print every rejection.
pub fn run(args: &ConvertArgs, out: &mut dyn Write) -> Result<()> {
    // Sorted so rejections and rule order do not depend on argument order.
    let mut batch_files = args.batch.clone();
    batch_files.sort();

    let mut converter = RecmdConverter::new();
    for path in &batch_files {
        converter
            .load_file(path)
            .with_context(|| format!("failed to convert {}", path.display()))?;
    }

    let dump = converter.dump()?;
    write_atomic(&args.output, dump.as_bytes())
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    for rejection in converter.errors() {
        writeln!(out, "Rule Rejected: {}", rejection)?;
    }

    info!(
        output = %args.output.display(),
        batches = converter.batch_count(),
        rules = converter.rules().len(),
        rejected = converter.errors().len(),
        "converted RECmd batches"
    );
    Ok(())
}
