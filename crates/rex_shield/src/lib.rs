pub mod guard;

// Re-export core types at crate root for convenience.
pub use guard::{GuardConfig, GuardViolation, PayloadGuard};
