//! Feature flags carried by the runtime configuration
//!
//! Flags come from two places:
//! - the `flags` object of the server override document
//! - `MAGICSAAS_FLAG_<NAME>` environment variables
//!
//! # Example
//!
//! ```rust
//! use magicsaas_core::feature_flags::FeatureFlags;
//!
//! let flags = FeatureFlags::new()
//!     .with_flag("new-checkout", true)
//!     .with_flag("experimental", false);
//!
//! assert!(flags.is_enabled("new-checkout"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix for flag environment variables
pub const FLAG_ENV_PREFIX: &str = "MAGICSAAS_FLAG_";

/// Feature flag value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// Boolean flag
    Bool(bool),
    /// Percentage rollout (0-100)
    Percentage(u8),
    /// Numeric value
    Number(f64),
    /// String value
    String(String),
}

impl FlagValue {
    /// Parse a raw string the way environment variables are interpreted
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" | "1" => FlagValue::Bool(true),
            "false" | "0" => FlagValue::Bool(false),
            _ => match raw.strip_suffix('%').map(str::parse::<u8>) {
                Some(Ok(p)) => FlagValue::Percentage(p.min(100)),
                _ => raw
                    .parse::<f64>()
                    .map(FlagValue::Number)
                    .unwrap_or_else(|_| FlagValue::String(raw.to_string())),
            },
        }
    }

    /// Check if flag is enabled (truthy)
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            FlagValue::Bool(b) => *b,
            FlagValue::String(s) => !s.is_empty() && s != "false" && s != "0",
            FlagValue::Number(n) => *n != 0.0,
            FlagValue::Percentage(p) => *p > 0,
        }
    }

    /// Get as string
    #[must_use]
    pub fn as_string(&self) -> String {
        match self {
            FlagValue::Bool(b) => b.to_string(),
            FlagValue::String(s) => s.clone(),
            FlagValue::Number(n) => n.to_string(),
            FlagValue::Percentage(p) => format!("{p}%"),
        }
    }
}

/// Feature flag definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    /// Flag value
    pub value: FlagValue,
    /// Description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Flag {
    /// Create a flag from a value
    pub fn new(value: FlagValue) -> Self {
        Self {
            value,
            description: String::new(),
        }
    }

    /// Add description
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Check if enabled for a specific tenant/user key (for percentage rollouts)
    #[must_use]
    pub fn is_enabled_for(&self, key: &str) -> bool {
        match &self.value {
            FlagValue::Percentage(p) => {
                let hash = key.bytes().fold(0u64, |acc, b| acc.wrapping_add(u64::from(b)));
                (hash % 100) < u64::from(*p)
            }
            other => other.is_enabled(),
        }
    }
}

/// Immutable set of named flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureFlags {
    flags: BTreeMap<String, Flag>,
}

impl FeatureFlags {
    /// Create an empty flag set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect flags from `(name, value)` environment pairs carrying
    /// [`FLAG_ENV_PREFIX`]. `MAGICSAAS_FLAG_NEW_CHECKOUT=1` becomes `new-checkout`.
    pub fn from_env_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let flags = pairs
            .into_iter()
            .filter_map(|(key, value)| {
                let name = key.as_ref().strip_prefix(FLAG_ENV_PREFIX)?;
                let name = name.to_lowercase().replace('_', "-");
                Some((name, Flag::new(FlagValue::parse(value.as_ref()))))
            })
            .collect();

        Self { flags }
    }

    /// Build from a plain `name -> value` map (the override document shape)
    pub fn from_values(values: BTreeMap<String, FlagValue>) -> Self {
        Self {
            flags: values
                .into_iter()
                .map(|(name, value)| (name, Flag::new(value)))
                .collect(),
        }
    }

    /// Add a boolean flag
    #[must_use]
    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), Flag::new(FlagValue::Bool(value)));
        self
    }

    /// Add a flag definition
    #[must_use]
    pub fn with_flag_def(mut self, name: impl Into<String>, flag: Flag) -> Self {
        self.flags.insert(name.into(), flag);
        self
    }

    /// Layer `other` on top of `self`; flags in `other` win
    #[must_use]
    pub fn merged(mut self, other: FeatureFlags) -> Self {
        self.flags.extend(other.flags);
        self
    }

    /// Check if a flag is enabled; unknown flags are off
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.flags.get(name).is_some_and(|f| f.value.is_enabled())
    }

    /// Check if a flag is enabled for a specific key
    #[must_use]
    pub fn is_enabled_for(&self, name: &str, key: &str) -> bool {
        self.flags.get(name).is_some_and(|f| f.is_enabled_for(key))
    }

    /// Get a flag value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name).map(|f| &f.value)
    }

    /// Number of flags
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether no flags are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Iterate flags in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Flag)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_value_parse() {
        assert_eq!(FlagValue::parse("true"), FlagValue::Bool(true));
        assert_eq!(FlagValue::parse("0"), FlagValue::Bool(false));
        assert_eq!(FlagValue::parse("25%"), FlagValue::Percentage(25));
        assert_eq!(FlagValue::parse("2.5"), FlagValue::Number(2.5));
        assert_eq!(FlagValue::parse("blue"), FlagValue::String("blue".into()));
    }

    #[test]
    fn test_flag_string() {
        assert!(FlagValue::String("value".into()).is_enabled());
        assert!(!FlagValue::String(String::new()).is_enabled());
        assert!(!FlagValue::String("false".into()).is_enabled());
    }

    #[test]
    fn test_flag_percentage() {
        assert!(Flag::new(FlagValue::Percentage(100)).is_enabled_for("tenant-a"));
        assert!(!Flag::new(FlagValue::Percentage(0)).is_enabled_for("tenant-a"));
    }

    #[test]
    fn test_from_env_pairs() {
        let flags = FeatureFlags::from_env_pairs([
            ("MAGICSAAS_FLAG_NEW_CHECKOUT", "1"),
            ("MAGICSAAS_FLAG_DARK_MODE", "false"),
            ("UNRELATED", "1"),
        ]);

        assert_eq!(flags.len(), 2);
        assert!(flags.is_enabled("new-checkout"));
        assert!(!flags.is_enabled("dark-mode"));
        assert!(!flags.is_enabled("unrelated"));
    }

    #[test]
    fn test_merged_prefers_other() {
        let base = FeatureFlags::new().with_flag("a", true).with_flag("b", true);
        let over = FeatureFlags::new().with_flag("b", false);

        let merged = base.merged(over);
        assert!(merged.is_enabled("a"));
        assert!(!merged.is_enabled("b"));
    }

    #[test]
    fn test_deserialize_override_shape() {
        let flags: FeatureFlags = serde_json::from_str(
            r#"{ "beta": { "value": true }, "rollout": { "value": 40, "description": "x" } }"#,
        )
        .unwrap();

        assert!(flags.is_enabled("beta"));
        assert_eq!(flags.get("rollout"), Some(&FlagValue::Percentage(40)));
    }
}
