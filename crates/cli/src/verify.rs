//! `verify recmd` command.

use std::io::Write;

use anyhow::{Context, Result};
use hunter_core::Config;
use hunter_rules::verify_recmd;

use crate::cli::VerifyRecmdArgs;

/// Print every unimplemented RECmd rule as YAML, then the total.
pub fn run(args: &VerifyRecmdArgs, config: Config, out: &mut dyn Write) -> Result<()> {
    let report = verify_recmd(&args.recmddir, &args.rules, &args.mapping, config)
        .context("RECmd verification failed")?;

    for rule in &report.unimplemented {
        writeln!(out, "{}", serde_yaml::to_string(rule)?)?;
    }
    writeln!(
        out,
        "Total {} rules are not implemented",
        report.unimplemented.len()
    )?;
    Ok(())
}
