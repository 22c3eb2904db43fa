//! Pétala-scoped API client for MagicSaaS backends
//!
//! One client per resolved [`RuntimeConfig`]: every request is scoped to the
//! tenant and vertical ("Pétala") the configuration describes.
//!
//! # Features
//!
//! - **Tenant envelope**: `X-Tenant-ID`, `X-Petala-Type`, `X-Petala-Name`,
//!   `X-Environment`, `X-MagicSaaS-Version` on every request
//! - **Session handling**: bearer token from a [`CredentialStore`]; a 401
//!   clears the session and redirects the [`Navigator`] to `/login`
//! - **Path scoping**: relative paths land under `/petalas/<slug>`
//! - **Retry with exponential backoff**: network failures and 5xx only
//! - **Typed facades**: products, cart, orders, appointments, customers,
//!   payments, reviews, analytics, Sofia
//!
//! # Example
//!
//! ```rust,no_run
//! use magicsaas_api_client::UniversalApiClient;
//! use magicsaas_runtime_config::{ConfigResolver, HttpHost};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = ConfigResolver::new(HttpHost::new("https://fashion.magicsaas.com/")?);
//!     let client = UniversalApiClient::new(resolver.resolve().await)?;
//!
//!     let cancelled = client.orders().cancel("order-1", "changed mind").await?;
//!     println!("{cancelled}");
//!
//!     Ok(())
//! }
//! ```
//!
//! [`RuntimeConfig`]: magicsaas_runtime_config::RuntimeConfig

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod navigation;
pub mod request;
pub mod session;
pub mod storage;

pub use client::{ClientBuilder, UniversalApiClient};
pub use reqwest::Method;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use navigation::{LOGIN_ROUTE, Navigator, RouteNavigator};
pub use request::ApiRequest;
pub use session::Session;
pub use storage::{CredentialStore, FileStore, MemoryStore};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::UniversalApiClient;
    pub use crate::endpoints::{
        AnalyticsApi, AppointmentsApi, CartApi, CustomersApi, OrdersApi, PaymentsApi, ProductsApi,
        ReviewsApi, SofiaApi,
    };
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::navigation::{Navigator, RouteNavigator};
    pub use crate::storage::{CredentialStore, FileStore, MemoryStore};
}
