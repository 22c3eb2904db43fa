//! Server-delivered partial configuration (`/config.json`)
//!
//! Every field is optional and unknown fields are ignored, so any subset of
//! the document may be present. Fields that are present replace the
//! computed defaults; absent fields leave them untouched.

use magicsaas_core::feature_flags::{FeatureFlags, FlagValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::RuntimeConfig;
use crate::environment::Environment;
use crate::petala::{PetalaIdentity, PetalaSource, PetalaType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantOverride {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiOverride {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeaturesOverride {
    pub analytics: Option<bool>,
    pub payments: Option<bool>,
    pub search: Option<bool>,
    pub sofia: Option<bool>,
    pub debug: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntegrationsOverride {
    pub stripe_public_key: Option<String>,
    pub payments_live_mode: Option<bool>,
    pub google_analytics_id: Option<String>,
    pub search_provider: Option<String>,
    pub search_host: Option<String>,
}

/// Partial `RuntimeConfig`-shaped document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverride {
    pub environment: Option<Environment>,
    pub petala: Option<PetalaType>,
    pub tenant: Option<TenantOverride>,
    pub api: Option<ApiOverride>,
    pub cms_url: Option<String>,
    pub sofia_url: Option<String>,
    pub features: Option<FeaturesOverride>,
    pub integrations: Option<IntegrationsOverride>,
    pub storage_key_prefix: Option<String>,
    pub version: Option<String>,
    pub flags: Option<BTreeMap<String, FlagValue>>,
}

impl ConfigOverride {
    /// Parse a document, ignoring unknown fields
    pub fn from_json(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    /// Whether the document carries no recognised field
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply present fields on top of `config`
    pub fn apply(self, mut config: RuntimeConfig) -> RuntimeConfig {
        if let Some(environment) = self.environment {
            config.environment = environment;
        }

        if let Some(petala) = self.petala {
            config.petala = PetalaIdentity::new(petala, PetalaSource::ServerOverride);
        }

        if let Some(tenant) = self.tenant {
            set(&mut config.tenant.id, tenant.id);
            set(&mut config.tenant.name, tenant.name);
        }

        if let Some(api) = self.api {
            set(&mut config.endpoints.api_url, api.base_url);
            if let Some(ms) = api.timeout_ms {
                config.api.timeout = Duration::from_millis(ms);
            }
            set(&mut config.api.retry.retry_attempts, api.retry_attempts);
            if let Some(ms) = api.retry_delay_ms {
                config.api.retry.base_delay = Duration::from_millis(ms);
            }
        }

        set(&mut config.endpoints.cms_url, self.cms_url);
        set(&mut config.endpoints.sofia_url, self.sofia_url);

        if let Some(features) = self.features {
            set(&mut config.features.analytics, features.analytics);
            set(&mut config.features.payments, features.payments);
            set(&mut config.features.search, features.search);
            set(&mut config.features.sofia, features.sofia);
            set(&mut config.features.debug, features.debug);
        }

        if let Some(integrations) = self.integrations {
            let target = &mut config.integrations;
            if integrations.stripe_public_key.is_some() {
                target.payments.public_key = integrations.stripe_public_key;
            }
            set(&mut target.payments.live_mode, integrations.payments_live_mode);
            if integrations.google_analytics_id.is_some() {
                target.analytics.google_analytics_id = integrations.google_analytics_id;
            }
            set(&mut target.search.provider, integrations.search_provider);
            if integrations.search_host.is_some() {
                target.search.host = integrations.search_host;
            }
        }

        set(&mut config.storage_key_prefix, self.storage_key_prefix);
        set(&mut config.version, self.version);

        if let Some(flags) = self.flags {
            config.flags = config.flags.merged(FeatureFlags::from_values(flags));
        }

        config
    }
}

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}
