//! Core [`RuleCompiler`] struct: accumulates rule files and renders the artifact.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use hunter_core::{CollisionPolicy, Config, RegistryRule, RuleFile};
use indexmap::IndexSet;
use tracing::{info, warn};

use crate::codec;
use crate::error::Result;
use crate::normalize::{route, Routed};
use crate::persist::write_atomic;
use crate::template::{ArtifactParameters, ArtifactRenderer, MetaParameters, MetaRule};

use super::diagnostics::Diagnostic;

/// Outcome of merging a single rule file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// Name of the file (or other source) that was merged.
    pub file: String,
    /// Rules declared in the file, before brace expansion.
    pub declared: usize,
    /// Glob rules added after brace expansion.
    pub glob_rules: usize,
    /// Full-query rules added.
    pub query_rules: usize,
    /// Glob rules discarded by the collision policy.
    pub dropped: usize,
}

/// Owner of a (Root, Glob) key in the collision index.
#[derive(Debug, Clone)]
struct GlobOwner {
    description: String,
    author: String,
}

/// Accumulates normalized rules across rule files and compiles them into
/// the generated artifact.
///
/// Loading is sequential; compilation only reads the accumulated state so it
/// can be repeated.
#[derive(Debug)]
pub struct RuleCompiler {
    config: Config,
    /// Glob rules in insertion order.
    rules: Vec<RegistryRule>,
    /// Full-query rules in insertion order.
    queries: Vec<RegistryRule>,
    /// First rule seen for each (Root, Glob) key.
    globs: HashMap<(String, String), GlobOwner>,
    /// Descriptions of every accepted rule.
    descriptions: HashSet<String>,
    preamble: IndexSet<String>,
    categories: IndexSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for RuleCompiler {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl RuleCompiler {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            rules: Vec::new(),
            queries: Vec::new(),
            globs: HashMap::new(),
            descriptions: HashSet::new(),
            preamble: IndexSet::new(),
            categories: IndexSet::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read and merge one rule file.
    ///
    /// I/O and parse errors leave the accumulated state untouched.
    pub fn load_rules(&mut self, path: &Path) -> Result<LoadSummary> {
        let contents = fs::read_to_string(path)?;
        self.load_str(&contents, &path.display().to_string())
    }

    /// Parse a rule document (unknown fields are rejected) and merge it.
    pub fn load_str(&mut self, contents: &str, file: &str) -> Result<LoadSummary> {
        let rule_file: RuleFile = serde_yaml::from_str(contents)?;
        info!(count = rule_file.rules.len(), path = %file, "loading rules");
        Ok(self.merge(rule_file, file))
    }

    /// Normalize every rule of `rule_file` and merge it into the state.
    pub fn merge(&mut self, rule_file: RuleFile, file: &str) -> LoadSummary {
        let mut summary = LoadSummary {
            file: file.to_string(),
            declared: rule_file.rules.len(),
            glob_rules: 0,
            query_rules: 0,
            dropped: 0,
        };

        for rule in rule_file.rules {
            match route(rule) {
                Routed::Query(rule) => {
                    // Queries are filtered by category in the artifact, so
                    // their categories must be selectable.
                    self.categories.insert(rule.category.clone());
                    self.descriptions.insert(rule.description.clone());
                    self.queries.push(rule);
                    summary.query_rules += 1;
                }
                Routed::Glob(normalized) if normalized.rules.iter().all(|r| r.glob.is_empty()) => {
                    let description = normalized
                        .rules
                        .first()
                        .map(|r| r.description.clone())
                        .unwrap_or_default();
                    self.report(Diagnostic::EmptyGlob {
                        file: file.to_string(),
                        description,
                    });
                    summary.dropped += 1;
                }
                Routed::Glob(normalized) => {
                    if let Some(root) = normalized.unsupported_root {
                        let description = normalized
                            .rules
                            .first()
                            .map(|r| r.description.clone())
                            .unwrap_or_default();
                        self.report(Diagnostic::UnsupportedRoot {
                            file: file.to_string(),
                            description,
                            root,
                        });
                    }

                    for rule in normalized.rules {
                        if self.insert_glob_rule(rule, file) {
                            summary.glob_rules += 1;
                        } else {
                            summary.dropped += 1;
                        }
                    }
                }
            }
        }

        self.extend_preamble(rule_file.preamble);
        summary
    }

    /// Returns false when the collision policy discarded the rule.
    fn insert_glob_rule(&mut self, rule: RegistryRule, file: &str) -> bool {
        let key = (rule.root.clone(), rule.glob.clone());

        if let Some(existing) = self.globs.get(&key) {
            let diagnostic = Diagnostic::GlobCollision {
                file: file.to_string(),
                description: rule.description.clone(),
                author: rule.author_label().to_string(),
                glob: rule.glob.clone(),
                existing_description: existing.description.clone(),
                existing_author: existing.author.clone(),
                policy: self.config.collision_policy,
            };
            self.report(diagnostic);

            if self.config.collision_policy == CollisionPolicy::DropLater {
                return false;
            }
        } else {
            self.globs.insert(
                key,
                GlobOwner {
                    description: rule.description.clone(),
                    author: rule.author_label().to_string(),
                },
            );
        }

        self.extend_preamble(rule.preamble.iter().cloned());
        self.categories.insert(rule.category.clone());
        self.descriptions.insert(rule.description.clone());
        self.rules.push(rule);
        true
    }

    fn extend_preamble(&mut self, snippets: impl IntoIterator<Item = String>) {
        for snippet in snippets {
            if !snippet.is_empty() {
                self.preamble.insert(snippet);
            }
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!(path = %diagnostic.file(), "{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// Glob rules in load order.
    pub fn rules(&self) -> &[RegistryRule] {
        &self.rules
    }

    /// Full-query rules in load order.
    pub fn queries(&self) -> &[RegistryRule] {
        &self.queries
    }

    /// Every recoverable issue reported so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// True when any loaded rule (glob or query) has this description.
    pub fn contains_description(&self, description: &str) -> bool {
        self.descriptions.contains(description)
    }

    // ── Derived artifacts ───────────────────────────────────────────

    /// Glob rules as base64(gzip(JSON)).
    pub fn build_metadata(&self) -> Result<String> {
        codec::compress_json(&self.rules)
    }

    /// Full-query rules as base64(gzip(JSON)).
    pub fn build_queries(&self) -> Result<String> {
        codec::compress_json(&self.queries)
    }

    /// Unique preamble snippets, one per line, every line indented.
    pub fn build_preamble(&self) -> String {
        let mut text = String::new();
        for snippet in &self.preamble {
            text.push_str(snippet);
            text.push('\n');
        }

        let indent = " ".repeat(self.config.preamble_indent);
        text.split('\n')
            .map(|line| format!("{}{}", indent, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Distinct categories, sorted.
    pub fn build_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.categories.iter().cloned().collect();
        categories.sort();
        categories
    }

    // ── Outputs ─────────────────────────────────────────────────────

    /// Render the full artifact stamped with the current time.
    pub fn compile(&self) -> Result<String> {
        self.compile_at(Utc::now())
    }

    pub fn compile_at(&self, time: DateTime<Utc>) -> Result<String> {
        let categories = self.build_categories();
        let parameters = ArtifactParameters {
            name: &self.config.artifact_name,
            metadata: self.build_metadata()?,
            rules: &self.rules,
            preamble: self.build_preamble(),
            queries_json: self.build_queries()?,
            categories_json: serde_json::to_string(&categories)?,
            categories,
            time: format_time(time),
        };
        ArtifactRenderer::new()?.render_artifact(&parameters)
    }

    /// Render the rules-only metadata artifact stamped with the current time.
    pub fn compile_meta(&self) -> Result<String> {
        self.compile_meta_at(Utc::now())
    }

    pub fn compile_meta_at(&self, time: DateTime<Utc>) -> Result<String> {
        let rules: Vec<MetaRule<'_>> = self
            .rules
            .iter()
            .chain(self.queries.iter())
            .map(MetaRule::from)
            .collect();
        let parameters = MetaParameters {
            name: format!("{}.Meta", self.config.artifact_name),
            artifact: &self.config.artifact_name,
            time: format_time(time),
            categories: self.build_categories(),
            rules_json: serde_json::to_string(&rules)?,
            rules,
        };
        ArtifactRenderer::new()?.render_meta(&parameters)
    }

    /// Glob rules serialized as YAML, for inspection or packaging.
    pub fn get_rules(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.rules)?)
    }

    /// Write the glob rules as uncompressed JSON.
    pub fn write_index(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_vec(&self.rules)?;
        write_atomic(path, &serialized)?;
        info!(path = %path.display(), count = self.rules.len(), "wrote rule index");
        Ok(())
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
