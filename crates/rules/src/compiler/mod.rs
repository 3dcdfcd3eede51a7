//! Rule compiler: merges rule files into one normalized rule set and
//! renders the hunting artifact from it.
//!
//! Each loaded rule is normalized (separators, root casing, brace
//! expansion), checked against the collision index, and folded into the
//! preamble and category sets. Compilation is a read-only snapshot of that
//! state.

mod core;
mod diagnostics;


pub use self::core::{LoadSummary, RuleCompiler};
pub use self::diagnostics::Diagnostic;
