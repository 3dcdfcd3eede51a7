pub mod config;
pub mod rule;

pub use config::{CollisionPolicy, Config, ConfigError};
pub use rule::*;
