use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled key: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_lookup<F>(lookup: &F, profile: &str, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = lookup(&prefixed).filter(|s| !s.is_empty()) {
            return Some(v);
        }
    }
    lookup(key).filter(|s| !s.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

// ── Collision policy ──────────────────────────────────────────

/// What the compiler does with a glob rule whose (Root, Glob) key was
/// already claimed by an earlier rule. A warning is emitted either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Keep the earlier and the later rule in the output.
    #[default]
    KeepBoth,
    /// Keep the earlier rule and discard the later one entirely.
    DropLater,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::KeepBoth => write!(f, "keep-both"),
            CollisionPolicy::DropLater => write!(f, "drop-later"),
        }
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "keep-both" => Ok(CollisionPolicy::KeepBoth),
            "drop-later" => Ok(CollisionPolicy::DropLater),
            other => Err(format!(
                "unknown collision policy '{}' (expected keep-both or drop-later)",
                other
            )),
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Display name of the generated artifact.
    pub artifact_name: String,
    pub collision_policy: CollisionPolicy,
    /// Number of spaces each preamble line is indented by.
    pub preamble_indent: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            artifact_name: "Windows.Registry.Hunter".to_string(),
            collision_policy: CollisionPolicy::default(),
            preamble_indent: 4,
        }
    }
}

impl Config {
    /// Build config from an optional TOML file, then apply environment
    /// overrides (call `load_dotenv()` first).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_toml_file(p)?,
            None => Self::default(),
        };
        config.apply_env_with(env_opt)?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading config file");
        Ok(toml::from_str(&content)?)
    }

    /// Apply overrides from a key lookup. Profile is read from
    /// `HUNTER_PROFILE`. When set (e.g. `CI`), every key is first looked up
    /// as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = lookup("HUNTER_PROFILE").unwrap_or_default().to_uppercase();
        let p = profile.as_str();

        if let Some(name) = profiled_lookup(&lookup, p, "HUNTER_ARTIFACT_NAME") {
            self.artifact_name = name;
        }
        if let Some(policy) = profiled_lookup(&lookup, p, "HUNTER_COLLISION_POLICY") {
            self.collision_policy = policy.parse().map_err(|message| ConfigError::Invalid {
                key: "HUNTER_COLLISION_POLICY".to_string(),
                message,
            })?;
        }
        if let Some(indent) = profiled_lookup(&lookup, p, "HUNTER_PREAMBLE_INDENT") {
            self.preamble_indent = indent.parse().map_err(|e| ConfigError::Invalid {
                key: "HUNTER_PREAMBLE_INDENT".to_string(),
                message: format!("{}", e),
            })?;
        }
        Ok(())
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!(
            artifact = %self.artifact_name,
            collision_policy = %self.collision_policy,
            preamble_indent = self.preamble_indent,
            "config loaded"
        );
    }
}
