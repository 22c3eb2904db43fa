//! Runtime configuration for MagicSaaS Pétala clients
//!
//! Detects the execution environment, the active vertical ("Pétala") and
//! the backing endpoints from ambient signals, optionally layering a
//! server-delivered `/config.json` on top.
//!
//! # Features
//!
//! - **Environment detection**: development / staging / production from the hostname
//! - **Vertical detection**: subdomain, path prefix, custom domain, meta tag, default
//! - **Endpoint derivation**: explicit env override, `AUTO`, or `https://api.<domain>`
//! - **Best-effort overrides**: a failed `/config.json` fetch never blocks boot
//! - **Cached resolution**: one `Arc<RuntimeConfig>` per resolver until `reset()`
//!
//! # Example
//!
//! ```rust
//! use magicsaas_runtime_config::{ConfigResolver, StaticHost};
//!
//! # tokio_test::block_on(async {
//! let resolver = ConfigResolver::new(StaticHost::new("fashion.magicsaas.com"));
//! let config = resolver.resolve().await;
//!
//! assert_eq!(config.petala.base_path, "/petalas/fashion");
//! assert_eq!(config.endpoints.api_url, "https://api.magicsaas.com");
//! # });
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod environment;
pub mod overrides;
pub mod petala;
pub mod host;
pub mod resolver;

pub use config::{ApiSettings, Endpoints, FeatureToggles, RuntimeConfig, TenantIdentity};
pub use environment::Environment;
pub use overrides::ConfigOverride;
pub use petala::{PetalaIdentity, PetalaSource, PetalaType};
pub use host::{HostContext, HttpHost, StaticHost};
pub use resolver::{ConfigResolver, ResolverOptions};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::RuntimeConfig;
    pub use crate::environment::Environment;
    pub use crate::petala::{PetalaIdentity, PetalaType};
    pub use crate::host::{HostContext, HttpHost, StaticHost};
    pub use crate::resolver::{ConfigResolver, ResolverOptions};
}
