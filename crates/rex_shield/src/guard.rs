use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Why a payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GuardViolation {
    /// An object key that can override shared-object internals downstream.
    #[error("Forbidden key `{key}` at {path}")]
    ForbiddenKey { key: String, path: String },

    /// The payload nests deeper than the configured limit.
    #[error("Payload nesting exceeds {max_depth} levels at {path}")]
    TooDeep { max_depth: usize, path: String },
}

/// Configuration for the payload guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    pub max_depth: usize,
    /// Additional exact key names to reject.
    pub extra_forbidden_keys: Vec<String>,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            extra_forbidden_keys: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

const FORBIDDEN_KEYS: &[&str] = &["__proto__", "constructor", "prototype"];

/// Double-underscore accessors such as `__defineGetter__`.
static DUNDER_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^__[A-Za-z0-9_]+__$").expect("valid regex: dunder key"));

// ---------------------------------------------------------------------------
// PayloadGuard
// ---------------------------------------------------------------------------

/// Rejects request payloads shaped to tamper with object internals.
///
/// The walk is iterative, so a hostile nesting depth cannot exhaust the
/// stack before the depth limit is reported.
pub struct PayloadGuard {
    config: GuardConfig,
}

impl PayloadGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Whether `key` is never allowed in a payload.
    pub fn is_forbidden_key(&self, key: &str) -> bool {
        FORBIDDEN_KEYS.contains(&key)
            || DUNDER_KEY.is_match(key)
            || self.config.extra_forbidden_keys.iter().any(|k| k == key)
    }

    /// Check every key and nesting level of `value`.
    pub fn inspect(&self, value: &Value) -> Result<(), GuardViolation> {
        let mut stack: Vec<(&Value, String, usize)> = vec![(value, "$".to_string(), 0)];

        while let Some((node, path, depth)) = stack.pop() {
            if depth > self.config.max_depth {
                warn!(path = %path, max_depth = self.config.max_depth, "payload too deep");
                return Err(GuardViolation::TooDeep {
                    max_depth: self.config.max_depth,
                    path,
                });
            }

            match node {
                Value::Object(map) => {
                    for (key, child) in map {
                        let child_path = format!("{path}.{key}");
                        if self.is_forbidden_key(key) {
                            warn!(path = %child_path, "forbidden key in payload");
                            return Err(GuardViolation::ForbiddenKey {
                                key: key.clone(),
                                path: child_path,
                            });
                        }
                        stack.push((child, child_path, depth + 1));
                    }
                }
                Value::Array(items) => {
                    for (idx, child) in items.iter().enumerate() {
                        stack.push((child, format!("{path}[{idx}]"), depth + 1));
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

impl Default for PayloadGuard {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}
