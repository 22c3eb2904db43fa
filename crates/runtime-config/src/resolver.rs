//! Best-effort, cached configuration resolution
//!
//! Resolution never fails: every step that cannot produce a value falls
//! back to a computed default, and a failed or invalid override document is
//! logged and skipped.

use magicsaas_core::feature_flags::{FeatureFlags, FLAG_ENV_PREFIX};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{
    env_keys, AnalyticsIntegration, ApiSettings, Endpoints, FeatureToggles, Integrations,
    PaymentsIntegration, RuntimeConfig, SearchIntegration, TenantIdentity, AUTO_SENTINEL,
    DEV_API_URL, DEV_SOFIA_URL, PLATFORM_VERSION,
};
use crate::environment::{registrable_domain, Environment};
use crate::petala::{detect_petala, PetalaSignals, PetalaType, PETALA_META_TAG};
use crate::host::HostContext;

/// Knobs that are not ambient signals
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Fetch `/config.json` during resolution
    pub fetch_override: bool,
    /// Full hostname (without `www.`) -> vertical
    pub custom_domains: HashMap<String, PetalaType>,
    /// Vertical used when no signal matches
    pub default_petala: PetalaType,
    /// Storage key prefix unless the environment sets one
    pub storage_key_prefix: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            fetch_override: true,
            custom_domains: HashMap::new(),
            default_petala: PetalaType::Fashion,
            storage_key_prefix: "magicsaas".to_string(),
        }
    }
}

impl ResolverOptions {
    #[must_use]
    pub fn without_override_fetch(mut self) -> Self {
        self.fetch_override = false;
        self
    }

    #[must_use]
    pub fn with_custom_domain(mut self, host: impl Into<String>, petala: PetalaType) -> Self {
        self.custom_domains.insert(host.into().to_ascii_lowercase(), petala);
        self
    }

    #[must_use]
    pub fn with_default_petala(mut self, petala: PetalaType) -> Self {
        self.default_petala = petala;
        self
    }
}

/// Resolves a [`RuntimeConfig`] once and hands out the same `Arc` until
/// [`ConfigResolver::reset`] is called.
pub struct ConfigResolver<P> {
    host: P,
    options: ResolverOptions,
    cached: Mutex<Option<Arc<RuntimeConfig>>>,
}

impl<P: HostContext> ConfigResolver<P> {
    /// Create a resolver with default options
    pub fn new(host: P) -> Self {
        Self::with_options(host, ResolverOptions::default())
    }

    /// Create a resolver with specific options
    pub fn with_options(host: P, options: ResolverOptions) -> Self {
        Self {
            host,
            options,
            cached: Mutex::new(None),
        }
    }

    /// The host context this resolver reads from
    pub fn host(&self) -> &P {
        &self.host
    }

    /// Resolve, or return the cached configuration.
    ///
    /// Concurrent first callers wait on the same resolution, so the
    /// override document is fetched at most once per cache lifetime.
    pub async fn resolve(&self) -> Arc<RuntimeConfig> {
        let mut cached = self.cached.lock().await;
        if let Some(config) = cached.as_ref() {
            return Arc::clone(config);
        }

        let config = Arc::new(self.build().await);
        info!(
            environment = %config.environment,
            petala = %config.petala.petala_type,
            detected_by = ?config.petala.detected_by,
            api_url = %config.endpoints.api_url,
            "Runtime configuration resolved"
        );

        *cached = Some(Arc::clone(&config));
        config
    }

    /// Drop the cached configuration; the next `resolve` starts over
    pub async fn reset(&self) {
        self.cached.lock().await.take();
    }

    async fn build(&self) -> RuntimeConfig {
        let defaults = compute_defaults(&self.host, &self.options);

        if !self.options.fetch_override {
            return defaults;
        }

        let document = match self.host.fetch_override().await {
            Ok(document) => document,
            Err(e) => {
                debug!(error = %e, "No runtime override, using computed defaults");
                return defaults;
            }
        };

        if document.is_empty() {
            return defaults;
        }

        let merged = document.apply(defaults.clone());
        match merged.validate() {
            Ok(()) => merged,
            Err(e) => {
                warn!(error = %e, "Ignoring invalid runtime override");
                defaults
            }
        }
    }
}

/// Build the configuration from ambient signals alone
pub fn compute_defaults<P: HostContext + ?Sized>(
    host: &P,
    options: &ResolverOptions,
) -> RuntimeConfig {
    let hostname = host.hostname();
    let pathname = host.pathname();
    let meta = host.meta_tag(PETALA_META_TAG);

    let environment = Environment::detect(&hostname);
    let petala = detect_petala(
        PetalaSignals {
            hostname: &hostname,
            pathname: &pathname,
            meta_tag: meta.as_deref(),
        },
        &options.custom_domains,
        options.default_petala,
    );

    let tenant = TenantIdentity {
        id: host
            .env_var(env_keys::TENANT_ID)
            .unwrap_or_else(|| TenantIdentity::default().id),
        name: host
            .env_var(env_keys::TENANT_NAME)
            .unwrap_or_else(|| TenantIdentity::default().name),
    };

    let endpoints = Endpoints {
        api_url: resolve_service_url(
            environment,
            &hostname,
            "api",
            DEV_API_URL,
            host.env_var(env_keys::API_URL).as_deref(),
        ),
        cms_url: resolve_service_url(
            environment,
            &hostname,
            "cms",
            DEV_API_URL,
            host.env_var(env_keys::CMS_URL).as_deref(),
        ),
        sofia_url: resolve_service_url(
            environment,
            &hostname,
            "sofia",
            DEV_SOFIA_URL,
            host.env_var(env_keys::SOFIA_URL).as_deref(),
        ),
    };

    let integrations = Integrations {
        payments: PaymentsIntegration {
            provider: "stripe".to_string(),
            public_key: host.env_var(env_keys::STRIPE_PUBLIC_KEY),
            live_mode: environment.is_production(),
        },
        analytics: AnalyticsIntegration {
            google_analytics_id: host.env_var(env_keys::GA_ID),
        },
        search: SearchIntegration {
            provider: "meilisearch".to_string(),
            host: host.env_var(env_keys::SEARCH_HOST),
        },
    };

    RuntimeConfig {
        environment,
        petala,
        tenant,
        endpoints,
        api: ApiSettings::for_environment(environment),
        features: FeatureToggles::for_environment(environment),
        integrations,
        storage_key_prefix: host
            .env_var(env_keys::STORAGE_PREFIX)
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| options.storage_key_prefix.clone()),
        version: PLATFORM_VERSION.to_string(),
        flags: FeatureFlags::from_env_pairs(host.env_vars_with_prefix(FLAG_ENV_PREFIX)),
    }
}

/// Explicit value unless absent, blank or `AUTO`; else the development URL
/// or `https://<service>.<registrable domain>`.
pub fn resolve_service_url(
    environment: Environment,
    hostname: &str,
    service: &str,
    dev_url: &str,
    explicit: Option<&str>,
) -> String {
    if let Some(url) = explicit
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(AUTO_SENTINEL))
    {
        return url.to_string();
    }

    match environment {
        Environment::Development => dev_url.to_string(),
        Environment::Staging | Environment::Production => {
            format!("https://{service}.{}", registrable_domain(hostname))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{ApiOverride, ConfigOverride, FeaturesOverride, TenantOverride};
    use crate::petala::PetalaSource;
    use crate::host::StaticHost;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fashion_scenario() {
        let resolver = ConfigResolver::new(StaticHost::new("fashion.magicsaas.com"));
        let config = resolver.resolve().await;

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.petala.name, "Fashion");
        assert_eq!(config.petala.petala_type, PetalaType::Fashion);
        assert_eq!(config.petala.base_path, "/petalas/fashion");
        assert_eq!(config.endpoints.api_url, "https://api.magicsaas.com");
        assert!(config.features.analytics);
    }

    #[tokio::test]
    async fn test_development_defaults() {
        let resolver = ConfigResolver::new(StaticHost::new("localhost").with_path("/petalas/restaurant/"));
        let config = resolver.resolve().await;

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.petala.petala_type, PetalaType::Restaurant);
        assert_eq!(config.endpoints.api_url, "http://localhost:8055");
        assert_eq!(config.endpoints.sofia_url, "http://localhost:3001");
        assert_eq!(config.api.retry.retry_attempts, 1);
        assert!(!config.features.analytics);
        assert!(config.features.debug);
    }

    #[test]
    fn test_api_url_explicit_and_auto() {
        let host = "www.shop.com";
        let prod = Environment::Production;

        assert_eq!(
            resolve_service_url(prod, host, "api", DEV_API_URL, Some("https://edge.example.com")),
            "https://edge.example.com"
        );
        assert_eq!(resolve_service_url(prod, host, "api", DEV_API_URL, Some("AUTO")), "https://api.shop.com");
        assert_eq!(resolve_service_url(prod, host, "api", DEV_API_URL, Some("  ")), "https://api.shop.com");
        assert_eq!(resolve_service_url(prod, host, "api", DEV_API_URL, None), "https://api.shop.com");
        assert_eq!(
            resolve_service_url(Environment::Staging, "staging.shop.com", "api", DEV_API_URL, None),
            "https://api.shop.com"
        );
    }

    #[tokio::test]
    async fn test_env_vars_feed_config() {
        let host = StaticHost::new("beauty.magicsaas.com")
            .with_env(env_keys::API_URL, "https://api.internal.example")
            .with_env(env_keys::TENANT_ID, "acme")
            .with_env(env_keys::TENANT_NAME, "Acme Corp")
            .with_env(env_keys::STORAGE_PREFIX, "acme")
            .with_env(env_keys::STRIPE_PUBLIC_KEY, "pk_test_123")
            .with_env("MAGICSAAS_FLAG_NEW_CHECKOUT", "true");
        let config = ConfigResolver::new(host).resolve().await;

        assert_eq!(config.endpoints.api_url, "https://api.internal.example");
        assert_eq!(config.tenant.id, "acme");
        assert_eq!(config.tenant.name, "Acme Corp");
        assert_eq!(config.token_key(), "acme_token");
        assert_eq!(config.integrations.payments.public_key.as_deref(), Some("pk_test_123"));
        assert!(config.flags.is_enabled("new-checkout"));
    }

    #[tokio::test]
    async fn test_singleton_until_reset() {
        let resolver = ConfigResolver::new(StaticHost::new("fashion.magicsaas.com"));

        let first = resolver.resolve().await;
        let second = resolver.resolve().await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.host().fetch_count(), 1);

        resolver.reset().await;
        let third = resolver.resolve().await;
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
        assert_eq!(resolver.host().fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_resolves_share_one_fetch() {
        let resolver = Arc::new(ConfigResolver::new(StaticHost::new("fashion.magicsaas.com")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                tokio::spawn(async move { resolver.resolve().await })
            })
            .collect();

        let mut configs = Vec::new();
        for handle in handles {
            configs.push(handle.await.unwrap());
        }

        assert!(configs.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(resolver.host().fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_override_takes_precedence() {
        let document = ConfigOverride {
            petala: Some(PetalaType::Restaurant),
            tenant: Some(TenantOverride {
                id: Some("bistro".to_string()),
                name: None,
            }),
            api: Some(ApiOverride {
                retry_attempts: Some(5),
                retry_delay_ms: Some(250),
                ..ApiOverride::default()
            }),
            features: Some(FeaturesOverride {
                analytics: Some(false),
                ..FeaturesOverride::default()
            }),
            ..ConfigOverride::default()
        };
        let host = StaticHost::new("fashion.magicsaas.com").with_override(document);
        let config = ConfigResolver::new(host).resolve().await;

        assert_eq!(config.petala.petala_type, PetalaType::Restaurant);
        assert_eq!(config.petala.base_path, "/petalas/restaurant");
        assert_eq!(config.petala.detected_by, PetalaSource::ServerOverride);
        assert_eq!(config.tenant.id, "bistro");
        assert_eq!(config.tenant.name, "MagicSaaS");
        assert_eq!(config.api.retry.retry_attempts, 5);
        assert_eq!(config.api.retry.base_delay, Duration::from_millis(250));
        assert!(!config.features.analytics);
        assert_eq!(config.endpoints.api_url, "https://api.magicsaas.com");
    }

    #[tokio::test]
    async fn test_fetch_failure_is_silent() {
        let host = StaticHost::new("fashion.magicsaas.com").with_failing_fetch("connection refused");
        let with_failure = ConfigResolver::new(host).resolve().await;

        let baseline = ConfigResolver::with_options(
            StaticHost::new("fashion.magicsaas.com"),
            ResolverOptions::default().without_override_fetch(),
        )
        .resolve()
        .await;

        assert_eq!(*with_failure, *baseline);
    }

    #[tokio::test]
    async fn test_invalid_override_falls_back_to_defaults() {
        let document = ConfigOverride {
            api: Some(ApiOverride {
                base_url: Some("not-a-url".to_string()),
                ..ApiOverride::default()
            }),
            ..ConfigOverride::default()
        };
        let host = StaticHost::new("fashion.magicsaas.com").with_override(document);
        let config = ConfigResolver::new(host).resolve().await;

        assert_eq!(config.endpoints.api_url, "https://api.magicsaas.com");
    }

    #[tokio::test]
    async fn test_skip_fetch_option() {
        let resolver = ConfigResolver::with_options(
            StaticHost::new("fashion.magicsaas.com"),
            ResolverOptions::default().without_override_fetch(),
        );
        resolver.resolve().await;
        assert_eq!(resolver.host().fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_custom_domain_option() {
        let resolver = ConfigResolver::with_options(
            StaticHost::new("www.acme-store.com"),
            ResolverOptions::default().with_custom_domain("acme-store.com", PetalaType::Retail),
        );
        let config = resolver.resolve().await;

        assert_eq!(config.petala.petala_type, PetalaType::Retail);
        assert_eq!(config.endpoints.api_url, "https://api.acme-store.com");
    }
}
