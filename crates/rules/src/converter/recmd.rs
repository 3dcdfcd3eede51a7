use std::fmt;
use std::fs;
use std::path::Path;

use hunter_core::{RegistryRule, RuleFile};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::error::Result;

use super::hive::{BinaryConvert, Hive};

static DEFAULT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(default\)").expect("default marker pattern is valid"));

static BRACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").expect("brace pattern is valid"));

/// One key entry of a RECmd batch file. Fields the converter does not use
/// are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct KeyDescription {
    #[serde(deserialize_with = "scalar_string")]
    pub description: String,
    #[serde(deserialize_with = "scalar_string")]
    pub hive_type: String,
    #[serde(deserialize_with = "scalar_string")]
    pub category: String,
    /// Path of the key below the hive.
    #[serde(deserialize_with = "scalar_string")]
    pub key_path: String,
    /// Restricts the match to a single value of the key.
    #[serde(deserialize_with = "scalar_string")]
    pub value_name: String,
    /// Match every key below `key_path` as well.
    #[serde(deserialize_with = "scalar_bool")]
    pub recursive: bool,
    /// Decoding applied to binary values (`EPOCH`, `FILETIME`, `IP`).
    #[serde(deserialize_with = "scalar_string")]
    pub binary_convert: String,
    #[serde(deserialize_with = "scalar_string")]
    pub comment: String,
    #[serde(deserialize_with = "scalar_bool")]
    pub disabled: bool,
}

/// A RECmd batch file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct RecmdBatch {
    #[serde(deserialize_with = "scalar_string")]
    pub description: String,
    #[serde(deserialize_with = "scalar_string")]
    pub author: String,
    pub keys: Vec<KeyDescription>,
    #[serde(deserialize_with = "scalar_bool")]
    pub disabled: bool,
}

/// A key that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleError {
    /// Description of the rejected key.
    pub description: String,
    /// Reason, ready for display.
    pub error: String,
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.description, self.error)
    }
}

/// Accumulates converted rules and rejections across batch files.
#[derive(Debug, Default)]
pub struct RecmdConverter {
    batches: usize,
    output: RuleFile,
    errors: Vec<RuleError>,
}

impl RecmdConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and convert one batch file.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let data = fs::read_to_string(path)?;
        let before = self.output.rules.len();
        self.parse_yaml(&data)?;
        info!(
            path = %path.display(),
            count = self.output.rules.len() - before,
            "converted batch"
        );
        Ok(())
    }

    /// Convert one batch document.
    ///
    /// Only a document that fails to parse is an error. Keys that cannot be
    /// mapped are recorded in [`errors`](Self::errors) and skipped.
    pub fn parse_yaml(&mut self, data: &str) -> Result<()> {
        let batch: RecmdBatch = serde_yaml::from_str(data)?;
        if batch.disabled {
            debug!(description = %batch.description, "skipping disabled batch");
            return Ok(());
        }
        self.batches += 1;

        for key in batch.keys.iter().filter(|k| !k.disabled) {
            match convert_key(&batch.author, key) {
                Ok(rule) => self.output.rules.push(rule),
                Err(reason) => self.errors.push(RuleError {
                    description: key.description.clone(),
                    error: format!("While processing {}: {}", key.description, reason),
                }),
            }
        }
        Ok(())
    }

    /// Number of enabled batches converted so far.
    pub fn batch_count(&self) -> usize {
        self.batches
    }

    pub fn rules(&self) -> &[RegistryRule] {
        &self.output.rules
    }

    pub fn errors(&self) -> &[RuleError] {
        &self.errors
    }

    /// Converted rules as a loadable rule document.
    pub fn dump(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.output)?)
    }

    pub fn into_rule_file(self) -> RuleFile {
        self.output
    }
}

fn convert_key(author: &str, key: &KeyDescription) -> std::result::Result<RegistryRule, String> {
    let hive: Hive = key.hive_type.parse()?;
    let (root, prefix) = hive.mount();

    let mut glob = format!("{}{}", prefix, filter_key_path(&key.key_path));
    if key.recursive {
        glob.push_str("\\**");
    }
    if !key.value_name.is_empty() {
        glob.push('\\');
        glob.push_str(&escape_quotes(&filter_value(&key.value_name)));
    }

    let details = if key.binary_convert.is_empty() {
        None
    } else {
        let convert: BinaryConvert = key.binary_convert.parse()?;
        Some(convert.details().to_string())
    };

    Ok(RegistryRule {
        author: non_empty(author),
        description: key.description.clone(),
        category: key.category.clone(),
        comment: non_empty(&key.comment),
        glob: glob.strip_prefix('\\').unwrap_or(&glob).to_string(),
        root: root.to_string(),
        details,
        ..Default::default()
    })
}

/// Drop the default-value marker and neutralize brace groups.
pub(crate) fn filter_key_path(path: &str) -> String {
    let path = DEFAULT_MARKER.replace_all(path, "");
    BRACES.replace_all(&path, "?").into_owned()
}

/// The default value is addressed as `@`.
pub(crate) fn filter_value(name: &str) -> String {
    let name = DEFAULT_MARKER.replace_all(name, "@");
    BRACES.replace_all(&name, "?").into_owned()
}

/// Quote a glob component that itself contains double quotes.
pub(crate) fn escape_quotes(component: &str) -> String {
    if component.contains('"') {
        format!("\"{}\"", component.replace('"', "\\\""))
    } else {
        component.to_string()
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Batch files are hand written; accept any scalar where a string is expected.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected a scalar, found {:?}", other))),
    }
}

/// Flags may be written as booleans, yes/no, 0/1, or left empty.
fn scalar_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" | "false" | "no" | "0" => Ok(false),
            "true" | "yes" | "1" => Ok(true),
            _ => Err(D::Error::custom(format!("expected a boolean, found {:?}", s))),
        },
        Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(D::Error::custom(format!("expected a boolean, found {}", n))),
        },
        other => Err(D::Error::custom(format!("expected a boolean, found {:?}", other))),
    }
}
