//! The resolved runtime configuration
//!
//! A [`RuntimeConfig`] is built once by the [`crate::ConfigResolver`] and
//! shared as `Arc<RuntimeConfig>`; nothing mutates it afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `MAGICSAAS_API_URL` | API base URL, `AUTO` to derive from the hostname | derived |
//! | `MAGICSAAS_CMS_URL` | CMS (Directus) URL | derived |
//! | `MAGICSAAS_SOFIA_URL` | Sofia assistant URL | derived |
//! | `MAGICSAAS_TENANT_ID` | Tenant identifier | `default` |
//! | `MAGICSAAS_TENANT_NAME` | Tenant display name | `MagicSaaS` |
//! | `MAGICSAAS_STRIPE_PUBLIC_KEY` | Stripe publishable key | unset |
//! | `MAGICSAAS_GA_ID` | Google Analytics measurement id | unset |
//! | `MAGICSAAS_SEARCH_HOST` | Search service host | unset |
//! | `MAGICSAAS_STORAGE_PREFIX` | Prefix of persistent storage keys | `magicsaas` |
//! | `MAGICSAAS_FLAG_<NAME>` | Free-form feature flag | unset |

use magicsaas_core::feature_flags::FeatureFlags;
use magicsaas_core::retry::RetryConfig;
use magicsaas_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::environment::Environment;
use crate::petala::PetalaIdentity;

/// Environment variable names read through the host context
pub mod env_keys {
    pub const API_URL: &str = "MAGICSAAS_API_URL";
    pub const CMS_URL: &str = "MAGICSAAS_CMS_URL";
    pub const SOFIA_URL: &str = "MAGICSAAS_SOFIA_URL";
    pub const TENANT_ID: &str = "MAGICSAAS_TENANT_ID";
    pub const TENANT_NAME: &str = "MAGICSAAS_TENANT_NAME";
    pub const STRIPE_PUBLIC_KEY: &str = "MAGICSAAS_STRIPE_PUBLIC_KEY";
    pub const GA_ID: &str = "MAGICSAAS_GA_ID";
    pub const SEARCH_HOST: &str = "MAGICSAAS_SEARCH_HOST";
    pub const STORAGE_PREFIX: &str = "MAGICSAAS_STORAGE_PREFIX";
}

/// Sentinel meaning "derive the URL from the hostname"
pub const AUTO_SENTINEL: &str = "AUTO";

/// Local Directus instance used in development
pub const DEV_API_URL: &str = "http://localhost:8055";

/// Local Sofia assistant used in development
pub const DEV_SOFIA_URL: &str = "http://localhost:3001";

/// Platform version sent as `X-MagicSaaS-Version`
pub const PLATFORM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tenant identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantIdentity {
    pub id: String,
    pub name: String,
}

impl Default for TenantIdentity {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            name: "MagicSaaS".to_string(),
        }
    }
}

/// Backing network endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    pub api_url: String,
    pub cms_url: String,
    pub sofia_url: String,
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettings {
    #[serde(with = "millis_serde", rename = "timeoutMs")]
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl ApiSettings {
    /// Defaults for an environment: 10 s / one retry in development,
    /// 30 s / three retries elsewhere, 1 s base delay everywhere.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                timeout: Duration::from_secs(10),
                retry: RetryConfig::new(1, Duration::from_millis(1000)),
            },
            Environment::Staging | Environment::Production => Self {
                timeout: Duration::from_secs(30),
                retry: RetryConfig::new(3, Duration::from_millis(1000)),
            },
        }
    }
}

mod millis_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Product features switched on or off per environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureToggles {
    pub analytics: bool,
    pub payments: bool,
    pub search: bool,
    pub sofia: bool,
    pub debug: bool,
}

impl FeatureToggles {
    /// Analytics only in production, debug only in development
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            analytics: environment.is_production(),
            payments: true,
            search: true,
            sofia: true,
            debug: environment.is_development(),
        }
    }
}

/// Payment provider settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsIntegration {
    pub provider: String,
    pub public_key: Option<String>,
    pub live_mode: bool,
}

/// Analytics provider settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsIntegration {
    pub google_analytics_id: Option<String>,
}

/// Search provider settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIntegration {
    pub provider: String,
    pub host: Option<String>,
}

/// Third-party integrations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integrations {
    pub payments: PaymentsIntegration,
    pub analytics: AnalyticsIntegration,
    pub search: SearchIntegration,
}

/// Resolved, session-scoped configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub environment: Environment,
    pub petala: PetalaIdentity,
    pub tenant: TenantIdentity,
    pub endpoints: Endpoints,
    pub api: ApiSettings,
    pub features: FeatureToggles,
    pub integrations: Integrations,
    pub storage_key_prefix: String,
    pub version: String,
    pub flags: FeatureFlags,
}

impl RuntimeConfig {
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// API base URL without a trailing slash
    pub fn api_url(&self) -> &str {
        self.endpoints.api_url.trim_end_matches('/')
    }

    /// Storage key holding the bearer token
    pub fn token_key(&self) -> String {
        format!("{}_token", self.storage_key_prefix)
    }

    /// Storage key holding the signed-in user
    pub fn user_key(&self) -> String {
        format!("{}_user", self.storage_key_prefix)
    }

    /// Builder-style method to point the API at another base URL
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.api_url = url.into();
        self
    }

    /// Builder-style method to replace the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.api.retry = retry;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (field, url) in [
            ("endpoints.apiUrl", &self.endpoints.api_url),
            ("endpoints.cmsUrl", &self.endpoints.cms_url),
            ("endpoints.sofiaUrl", &self.endpoints.sofia_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::invalid_url(url).with_context(field));
            }
        }

        if self.api.timeout.is_zero() {
            return Err(Error::invalid_config_value("api.timeoutMs", "cannot be zero"));
        }

        if self.storage_key_prefix.trim().is_empty() {
            return Err(Error::invalid_config_value("storageKeyPrefix", "cannot be empty"));
        }

        if self.tenant.id.trim().is_empty() {
            return Err(Error::invalid_config_value("tenant.id", "cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::petala::{PetalaSource, PetalaType};

    fn sample() -> RuntimeConfig {
        RuntimeConfig {
            environment: Environment::Production,
            petala: PetalaIdentity::new(PetalaType::Fashion, PetalaSource::Default),
            tenant: TenantIdentity::default(),
            endpoints: Endpoints {
                api_url: "https://api.magicsaas.com/".to_string(),
                cms_url: "https://cms.magicsaas.com".to_string(),
                sofia_url: "https://sofia.magicsaas.com".to_string(),
            },
            api: ApiSettings::for_environment(Environment::Production),
            features: FeatureToggles::for_environment(Environment::Production),
            integrations: Integrations {
                payments: PaymentsIntegration {
                    provider: "stripe".to_string(),
                    public_key: None,
                    live_mode: true,
                },
                analytics: AnalyticsIntegration {
                    google_analytics_id: None,
                },
                search: SearchIntegration {
                    provider: "meilisearch".to_string(),
                    host: None,
                },
            },
            storage_key_prefix: "magicsaas".to_string(),
            version: PLATFORM_VERSION.to_string(),
            flags: FeatureFlags::new(),
        }
    }

    #[test]
    fn test_storage_keys() {
        let config = sample();
        assert_eq!(config.token_key(), "magicsaas_token");
        assert_eq!(config.user_key(), "magicsaas_user");
    }

    #[test]
    fn test_api_url_trims_slash() {
        assert_eq!(sample().api_url(), "https://api.magicsaas.com");
    }

    #[test]
    fn test_feature_defaults() {
        let prod = FeatureToggles::for_environment(Environment::Production);
        let dev = FeatureToggles::for_environment(Environment::Development);
        let staging = FeatureToggles::for_environment(Environment::Staging);

        assert!(prod.analytics && !prod.debug);
        assert!(!dev.analytics && dev.debug);
        assert!(!staging.analytics && !staging.debug);
    }

    #[test]
    fn test_validation() {
        assert!(sample().validate().is_ok());

        let invalid = sample().with_api_url("ftp://api.magicsaas.com");
        assert!(invalid.validate().is_err());

        let mut zero = sample();
        zero.api.timeout = Duration::ZERO;
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["petala"]["basePath"], "/petalas/fashion");
        assert_eq!(json["endpoints"]["apiUrl"], "https://api.magicsaas.com/");
        assert_eq!(json["api"]["timeoutMs"], 30_000);
    }
}
