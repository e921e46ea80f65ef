//! # Runtime Configuration Module
//!
//! Environment-driven settings for the coroutine runtime and the TLS
//! transport's per-connection sockets.
//!
//! ## Environment Variables
//!
//! ### `FIRSTAPP_STACK_SIZE`
//!
//! Stack size for request coroutines. Accepts decimal (`65536`) or
//! hexadecimal (`0x10000`). Default: `0x10000` (64 KB).
//!
//! ### `FIRSTAPP_READ_TIMEOUT_SECS`
//!
//! Socket read timeout for TLS connections, in whole seconds. Unset, empty,
//! `0` or unparseable means no timeout.
//!
//! ## Usage
//!
//! ```rust
//! use firstapp::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.stack_size > 0);
//! ```

use std::env;
use std::time::Duration;

/// Default coroutine stack size (64 KB)
pub const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Read timeout applied to each accepted TLS socket
    pub read_timeout: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            read_timeout: None,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            env::var("FIRSTAPP_STACK_SIZE").ok().as_deref(),
            env::var("FIRSTAPP_READ_TIMEOUT_SECS").ok().as_deref(),
        )
    }

    fn from_values(stack_size: Option<&str>, read_timeout: Option<&str>) -> Self {
        Self {
            stack_size: stack_size
                .and_then(parse_stack_size)
                .unwrap_or(DEFAULT_STACK_SIZE),
            read_timeout: read_timeout
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

fn parse_stack_size(val: &str) -> Option<usize> {
    let val = val.trim();
    let parsed = match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    };
    parsed.filter(|size| *size > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let cfg = RuntimeConfig::from_values(None, None);
        assert_eq!(cfg, RuntimeConfig::default());
        assert_eq!(cfg.stack_size, 0x10000);
        assert_eq!(cfg.read_timeout, None);
    }

    #[test]
    fn test_stack_size_hex_and_decimal() {
        assert_eq!(
            RuntimeConfig::from_values(Some("0x8000"), None).stack_size,
            0x8000
        );
        assert_eq!(
            RuntimeConfig::from_values(Some("32768"), None).stack_size,
            32768
        );
    }

    #[test]
    fn test_bad_stack_size_falls_back() {
        assert_eq!(
            RuntimeConfig::from_values(Some("lots"), None).stack_size,
            DEFAULT_STACK_SIZE
        );
        assert_eq!(
            RuntimeConfig::from_values(Some("0"), None).stack_size,
            DEFAULT_STACK_SIZE
        );
    }

    #[test]
    fn test_read_timeout() {
        assert_eq!(
            RuntimeConfig::from_values(None, Some("5")).read_timeout,
            Some(Duration::from_secs(5))
        );
        assert_eq!(RuntimeConfig::from_values(None, Some("0")).read_timeout, None);
        assert_eq!(RuntimeConfig::from_values(None, Some("x")).read_timeout, None);
    }
}
