//! Conversion of RECmd batch files (`.reb`) into registry rules.
//!
//! Batches are parsed leniently. A key that cannot be mapped is rejected on
//! its own and recorded as a [`RuleError`]; the rest of the batch still
//! converts.

mod hive;
mod recmd;


pub use self::hive::{BinaryConvert, Hive};
pub use self::recmd::{KeyDescription, RecmdBatch, RecmdConverter, RuleError};
