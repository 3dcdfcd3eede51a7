//! Recoverable issues found while loading rules.

use std::fmt;

use hunter_core::CollisionPolicy;

/// A non-fatal problem found while merging a rule file. Loading continues
/// after each one; the `Display` form is the single-line operator message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Root is not one of the mounted roots and was kept as written.
    UnsupportedRoot {
        file: String,
        description: String,
        root: String,
    },
    /// Rule has neither a Glob nor a Query and was skipped.
    EmptyGlob { file: String, description: String },
    /// Two glob rules normalize to the same (Root, Glob) key.
    GlobCollision {
        file: String,
        description: String,
        author: String,
        glob: String,
        existing_description: String,
        existing_author: String,
        policy: CollisionPolicy,
    },
}

impl Diagnostic {
    /// Name of the rule file the offending rule came from.
    pub fn file(&self) -> &str {
        match self {
            Diagnostic::UnsupportedRoot { file, .. } => file,
            Diagnostic::EmptyGlob { file, .. } => file,
            Diagnostic::GlobCollision { file, .. } => file,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedRoot {
                description, root, ..
            } => write!(f, "Rule {} uses an unsupported Root: {}", description, root),
            Diagnostic::EmptyGlob { description, .. } => write!(
                f,
                "Rule {} has neither a Glob nor a Query... skipping this rule!",
                description
            ),
            Diagnostic::GlobCollision {
                description,
                author,
                glob,
                existing_description,
                existing_author,
                policy,
                ..
            } => {
                write!(
                    f,
                    "Rule {} by {} has the same glob ({}) as rule {} by {}... ",
                    description, author, glob, existing_description, existing_author
                )?;
                match policy {
                    CollisionPolicy::KeepBoth => write!(f, "keeping both rules"),
                    CollisionPolicy::DropLater => write!(f, "skipping this rule!"),
                }
            }
        }
    }
}
