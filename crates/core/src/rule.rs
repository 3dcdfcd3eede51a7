//! Rule document model shared by the compiler, converter and CLI.
//!
//! Field names serialize in PascalCase to stay compatible with the rule
//! corpus on disk. Both types reject unknown fields so authoring typos
//! surface as parse errors instead of silently dropped settings.

use serde::{Deserialize, Serialize};

/// Filter applied when a rule does not define one: keys carry no data.
pub const DEFAULT_FILTER: &str = "x=>NOT IsKey(x=x)";

/// Details expression applied when a rule does not define one.
pub const DEFAULT_DETAILS: &str = "x=>x.Data";

/// One loadable rule document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RuleFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Snippets injected verbatim into the generated artifact's preamble.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preamble: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RegistryRule>,
}

/// A single hunting rule: a glob under a mounted root, or a full query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RegistryRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Human readable identity, also the key used for cross-referencing
    /// against other rule sets.
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Backslash separated pattern relative to `root`.
    #[serde(default)]
    pub glob: String,
    /// Mount point the glob is resolved under.
    #[serde(default)]
    pub root: String,

    /// A complete query. When present the rule bypasses glob handling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Enrichment expression evaluated against each matched item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Predicate excluding matched items. Defaults to [`DEFAULT_FILTER`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Rule-local snippets merged into the artifact preamble.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preamble: Vec<String>,
}

impl RegistryRule {
    /// True when the rule carries a non-empty full query.
    pub fn is_query(&self) -> bool {
        self.query.as_deref().is_some_and(|q| !q.is_empty())
    }

    pub fn effective_filter(&self) -> &str {
        match self.filter.as_deref() {
            Some(f) if !f.is_empty() => f,
            _ => DEFAULT_FILTER,
        }
    }

    pub fn effective_details(&self) -> &str {
        match self.details.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => DEFAULT_DETAILS,
        }
    }

    /// Author name for messages, `unknown` when unset.
    pub fn author_label(&self) -> &str {
        self.author.as_deref().unwrap_or("unknown")
    }
}
