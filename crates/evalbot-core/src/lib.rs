pub mod config;
pub mod error;
pub mod types;

pub use config::EvalbotConfig;
pub use error::{EvalbotError, Result};
pub use types::UserId;

/// Version string reported by the `version` command.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
