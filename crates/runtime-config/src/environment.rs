//! Execution environment classification from the serving hostname

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback registrable domain when the hostname carries none
pub const DEFAULT_DOMAIN: &str = "magicsaas.com";

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (localhost, loopback, `*.local`)
    Development,
    /// Staging hosts (`staging.` / `.stg.`)
    Staging,
    /// Everything else
    #[default]
    Production,
}

impl Environment {
    /// Classify a hostname.
    ///
    /// `localhost`, `127.0.0.1` and `*.local` are development; any hostname
    /// containing `staging.` or `.stg.` is staging; the rest is production.
    pub fn detect(hostname: &str) -> Self {
        let host = hostname.trim().to_ascii_lowercase();

        if host == "localhost" || host == "127.0.0.1" || host.ends_with(".local") {
            Self::Development
        } else if host.contains("staging.") || host.contains(".stg.") {
            Self::Staging
        } else {
            Self::Production
        }
    }

    /// Lowercase name, as sent in the `X-Environment` header
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The last two labels of `hostname` (`fashion.magicsaas.com` -> `magicsaas.com`).
///
/// Multi-label public suffixes such as `co.uk` are not recognised.
pub fn registrable_domain(hostname: &str) -> String {
    let host = hostname.trim().trim_end_matches('.').to_ascii_lowercase();
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();

    match labels.len() {
        0 | 1 => DEFAULT_DOMAIN.to_string(),
        n => labels[n - 2..].join("."),
    }
}

/// The leftmost label when the hostname has a subdomain in front of its
/// registrable domain (`fashion.magicsaas.com` -> `fashion`).
pub fn subdomain(hostname: &str) -> Option<String> {
    let host = hostname.trim().to_ascii_lowercase();
    let labels: Vec<&str> = host.split('.').collect();

    if labels.len() > 2 {
        Some(labels[0].to_string())
    } else {
        None
    }
}
