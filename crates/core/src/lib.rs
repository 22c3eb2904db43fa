//! Core primitives for the MagicSaaS Pétala runtime
//!
//! This crate provides functionality shared by the runtime-config resolver,
//! the API client and the CLI:
//!
//! - **Error handling**: Coded errors with context and recovery suggestions
//! - **Retry**: Exponential backoff with an explicit attempt counter
//! - **Feature flags**: Free-form flags delivered by the server or environment
//!
//! # Example
//!
//! ```rust
//! use magicsaas_core::retry::RetryConfig;
//! use std::time::Duration;
//!
//! let retry = RetryConfig::new(3, Duration::from_millis(1000));
//! assert_eq!(retry.delay_for_retry(3), Duration::from_millis(4000));
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod feature_flags;
pub mod retry;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::feature_flags::{FeatureFlags, Flag, FlagValue};
    pub use crate::retry::{retry_async, Attempt, RetryConfig, RetryResult};
}
