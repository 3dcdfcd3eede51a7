//! Minijinja rendering of the generated artifacts.
//!
//! Both templates are embedded at build time. They are parsed when the
//! renderer is created, so a broken template fails before any rendering
//! happens.

use hunter_core::RegistryRule;
use minijinja::{AutoEscape, Environment, Error, ErrorKind};
use serde::Serialize;

use crate::codec;
use crate::error::Result;

const ARTIFACT_TEMPLATE_NAME: &str = "artifact.yaml.j2";
const META_TEMPLATE_NAME: &str = "meta.yaml.j2";

/// Template for the full hunting artifact.
pub const ARTIFACT_TEMPLATE: &str = include_str!("../templates/artifact.yaml.j2");

/// Template for the rules-only metadata artifact.
pub const META_TEMPLATE: &str = include_str!("../templates/meta.yaml.j2");

/// Parameters the artifact template is rendered against.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactParameters<'a> {
    /// Display name of the artifact.
    pub name: &'a str,
    /// Glob rules as base64(gzip(JSON)).
    pub metadata: String,
    /// Glob rules as loaded.
    pub rules: &'a [RegistryRule],
    /// Deduplicated preamble, already indented.
    pub preamble: String,
    /// Full-query rules as base64(gzip(JSON)).
    pub queries_json: String,
    /// Sorted categories.
    pub categories: Vec<String>,
    pub categories_json: String,
    /// Build time, RFC 3339.
    pub time: String,
}

/// Parameters the metadata template is rendered against.
#[derive(Debug, Clone, Serialize)]
pub struct MetaParameters<'a> {
    pub name: String,
    /// Name of the artifact the metadata describes.
    pub artifact: &'a str,
    pub time: String,
    pub categories: Vec<String>,
    pub rules: Vec<MetaRule<'a>>,
    /// `rules` serialized as JSON.
    pub rules_json: String,
}

/// Rule summary exposed to the metadata template, with defaults applied.
#[derive(Debug, Clone, Serialize)]
pub struct MetaRule<'a> {
    pub description: &'a str,
    pub category: &'a str,
    pub author: &'a str,
    pub root: &'a str,
    pub glob: &'a str,
    pub query: bool,
    pub filter: &'a str,
    pub details: &'a str,
}

impl<'a> From<&'a RegistryRule> for MetaRule<'a> {
    fn from(rule: &'a RegistryRule) -> Self {
        Self {
            description: &rule.description,
            category: &rule.category,
            author: rule.author_label(),
            root: &rule.root,
            glob: &rule.glob,
            query: rule.is_query(),
            filter: rule.effective_filter(),
            details: rule.effective_details(),
        }
    }
}

/// Renders the embedded artifact templates.
pub struct ArtifactRenderer {
    env: Environment<'static>,
}

impl ArtifactRenderer {
    /// Build the environment and parse both templates.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Template`](crate::RulesError::Template) if a
    /// template has syntax errors.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        // Output is YAML consumed by another engine, never HTML.
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("compress", compress_filter);
        env.add_template(ARTIFACT_TEMPLATE_NAME, ARTIFACT_TEMPLATE)?;
        env.add_template(META_TEMPLATE_NAME, META_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render_artifact(&self, parameters: &ArtifactParameters<'_>) -> Result<String> {
        Ok(self.env.get_template(ARTIFACT_TEMPLATE_NAME)?.render(parameters)?)
    }

    pub fn render_meta(&self, parameters: &MetaParameters<'_>) -> Result<String> {
        Ok(self.env.get_template(META_TEMPLATE_NAME)?.render(parameters)?)
    }
}

/// Filter: gzip and base64 encode a string.
fn compress_filter(value: String) -> std::result::Result<String, Error> {
    codec::compress(value.as_bytes())
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))
}
