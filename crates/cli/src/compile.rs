//! `compile` command.

use anyhow::{Context, Result};
use hunter_core::Config;
use hunter_rules::persist::write_atomic;
use hunter_rules::RuleCompiler;
use tracing::{error, info};

use crate::cli::CompileArgs;
use crate::package::{build_zip, RULES_ENTRY};

pub fn run(args: &CompileArgs, config: Config) -> Result<()> {
    let mut compiler = RuleCompiler::new(config);

    for path in &args.rules {
        match compiler.load_rules(path) {
            Ok(_) => {}
            Err(e) if args.strict => {
                return Err(e).with_context(|| format!("failed to load {}", path.display()));
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load rule file, skipping");
            }
        }
    }

    let artifact = compiler.compile().context("failed to compile artifact")?;

    if args.make_zip {
        let artifact_entry = format!("{}.yaml", compiler.config().artifact_name);
        let rules = compiler.get_rules()?;
        let archive = build_zip(&[
            (artifact_entry.as_str(), artifact.as_bytes()),
            (RULES_ENTRY, rules.as_bytes()),
        ])?;
        write_atomic(&args.output, &archive)
            .with_context(|| format!("failed to write {}", args.output.display()))?;
    } else {
        write_atomic(&args.output, artifact.as_bytes())
            .with_context(|| format!("failed to write {}", args.output.display()))?;
    }

    if let Some(meta_path) = &args.meta {
        let meta = compiler.compile_meta().context("failed to compile metadata")?;
        write_atomic(meta_path, meta.as_bytes())
            .with_context(|| format!("failed to write {}", meta_path.display()))?;
    }

    if let Some(index_path) = &args.index {
        compiler
            .write_index(index_path)
            .with_context(|| format!("failed to write {}", index_path.display()))?;
    }

    info!(
        output = %args.output.display(),
        rules = compiler.rules().len(),
        queries = compiler.queries().len(),
        warnings = compiler.diagnostics().len(),
        "compiled artifact"
    );
    Ok(())
}
