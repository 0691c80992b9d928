pub mod config;
pub mod error;
pub mod logging;

pub use config::RexConfig;
pub use error::{ErrorCategory, RexError};
