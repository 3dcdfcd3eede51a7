//! Registry hunting rule compiler.
//!
//! This crate provides:
//! - Brace expansion and normalization of rule globs and roots
//! - A compiler that merges rule files, detects glob collisions and renders
//!   the hunting artifact through embedded minijinja templates
//! - A converter from RECmd batch files into rule files
//! - A coverage check of RECmd batches against the compiled rule set

pub mod codec;
pub mod compiler;
pub mod converter;
pub mod error;
pub mod glob;
pub mod normalize;
pub mod persist;
pub mod template;
pub mod verifier;

pub use compiler::{Diagnostic, LoadSummary, RuleCompiler};
pub use converter::{RecmdConverter, RuleError};
pub use error::{Result, RulesError};
pub use verifier::{verify_recmd, ExceptionMapping, VerifyReport};
