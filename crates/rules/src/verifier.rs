//! Coverage check of a RECmd batch corpus against the hunter rules.
//!
//! A converted RECmd rule counts as covered when a hunter rule has the same
//! description, or when the exception mapping lists it with a justification.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use hunter_core::{Config, RegistryRule};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::compiler::RuleCompiler;
use crate::converter::RecmdConverter;
use crate::error::{Result, RulesError};

/// RECmd descriptions that are deliberately not implemented, with a reason.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExceptionMapping {
    #[serde(rename = "RECmdRules", default)]
    pub recmd_rules: BTreeMap<String, Option<String>>,
}

impl ExceptionMapping {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    pub fn contains(&self, description: &str) -> bool {
        self.recmd_rules.contains_key(description)
    }
}

/// Outcome of [`verify_recmd`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerifyReport {
    /// Rules produced from the batch files.
    pub converted: usize,
    /// Converted rules with a matching hunter rule.
    pub implemented: usize,
    /// Converted rules listed in the exception mapping.
    pub excepted: usize,
    /// Converted rules covered by neither, in batch order.
    pub unimplemented: Vec<RegistryRule>,
}

/// Convert every `.reb` file in `reb_dir`, load `rule_files` and report the
/// RECmd rules that are neither implemented nor excepted.
///
/// Every I/O and parse failure is fatal here.
pub fn verify_recmd(
    reb_dir: &Path,
    rule_files: &[PathBuf],
    mapping_file: &Path,
    config: Config,
) -> Result<VerifyReport> {
    if rule_files.is_empty() {
        return Err(RulesError::Validation("no rule files given".to_string()));
    }
    let mapping = ExceptionMapping::load(mapping_file)?;

    let batch_files = list_batch_files(reb_dir)?;
    if batch_files.is_empty() {
        warn!(path = %reb_dir.display(), "no .reb files found");
    }

    let mut converter = RecmdConverter::new();
    for path in &batch_files {
        converter.load_file(path)?;
    }

    let mut compiler = RuleCompiler::new(config);
    for path in rule_files {
        compiler.load_rules(path)?;
    }

    let mut report = VerifyReport {
        converted: converter.rules().len(),
        ..Default::default()
    };
    for rule in converter.rules() {
        if compiler.contains_description(&rule.description) {
            report.implemented += 1;
        } else if mapping.contains(&rule.description) {
            report.excepted += 1;
        } else {
            report.unimplemented.push(rule.clone());
        }
    }

    info!(
        converted = report.converted,
        implemented = report.implemented,
        excepted = report.excepted,
        unimplemented = report.unimplemented.len(),
        "verified RECmd coverage"
    );
    Ok(report)
}

/// `.reb` files directly inside `dir`, sorted by name.
fn list_batch_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_batch = entry.file_name().to_string_lossy().ends_with(".reb");
        if is_batch && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
