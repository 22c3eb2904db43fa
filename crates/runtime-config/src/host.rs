//! Access to the ambient signals the resolver reads
//!
//! The resolver never touches process globals directly. It asks a
//! [`HostContext`] for the hostname, path, meta tags, environment
//! variables and the optional override document, so resolution can be
//! exercised without a real page or network.

use async_trait::async_trait;
use magicsaas_core::{Error, ErrorCode, Result, ResultExt};
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, Url};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::overrides::ConfigOverride;

/// Path of the override document, relative to the page origin
pub const OVERRIDE_PATH: &str = "/config.json";

/// Source of hostname, path, meta tags, env vars and the override document
#[async_trait]
pub trait HostContext: Send + Sync {
    /// Hostname of the page being served (no port)
    fn hostname(&self) -> String;

    /// Path of the page being served
    fn pathname(&self) -> String;

    /// Content of `<meta name="{name}">`, if present
    fn meta_tag(&self, name: &str) -> Option<String>;

    /// A build-time or process environment variable
    fn env_var(&self, name: &str) -> Option<String>;

    /// Every environment variable whose name starts with `prefix`
    fn env_vars_with_prefix(&self, prefix: &str) -> Vec<(String, String)>;

    /// Fetch the partial override document
    async fn fetch_override(&self) -> Result<ConfigOverride>;
}

/// What a [`StaticHost`] answers when asked for the override document
#[derive(Debug, Clone)]
enum OverrideResponse {
    Missing,
    Document(ConfigOverride),
    Failure(String),
}

/// Fixed, in-memory signals
#[derive(Debug)]
pub struct StaticHost {
    hostname: String,
    pathname: String,
    meta: HashMap<String, String>,
    env: HashMap<String, String>,
    response: OverrideResponse,
    fetches: AtomicUsize,
}

impl StaticHost {
    /// A host context for `hostname` at path `/`, no meta tags, env vars or override
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            pathname: "/".to_string(),
            meta: HashMap::new(),
            env: HashMap::new(),
            response: OverrideResponse::Missing,
            fetches: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_path(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = pathname.into();
        self
    }

    #[must_use]
    pub fn with_meta(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.meta.insert(name.into(), content.into());
        self
    }

    #[must_use]
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_override(mut self, document: ConfigOverride) -> Self {
        self.response = OverrideResponse::Document(document);
        self
    }

    /// Make every override fetch fail with `message`
    #[must_use]
    pub fn with_failing_fetch(mut self, message: impl Into<String>) -> Self {
        self.response = OverrideResponse::Failure(message.into());
        self
    }

    /// How many times the override document was requested
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostContext for StaticHost {
    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn pathname(&self) -> String {
        self.pathname.clone()
    }

    fn meta_tag(&self, name: &str) -> Option<String> {
        self.meta.get(name).cloned()
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn env_vars_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        self.env
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    async fn fetch_override(&self) -> Result<ConfigOverride> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            OverrideResponse::Missing => Err(Error::http_status(404, OVERRIDE_PATH)),
            OverrideResponse::Document(doc) => Ok(doc.clone()),
            OverrideResponse::Failure(message) => Err(Error::network(message.clone())),
        }
    }
}

/// Signals from a page URL, the process environment and a live
/// `GET <origin>/config.json`
#[derive(Debug, Clone)]
pub struct HttpHost {
    page: Url,
    meta: HashMap<String, String>,
    client: Client,
}

impl HttpHost {
    /// Read the page at `page_url`
    pub fn new(page_url: &str) -> Result<Self> {
        let page = Url::parse(page_url).map_err(|e| Error::invalid_url(page_url).with_source(e))?;
        if page.host_str().is_none() {
            return Err(Error::invalid_url(page_url));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| Error::network("Failed to build HTTP client").with_source(e))?;

        Ok(Self {
            page,
            meta: HashMap::new(),
            client,
        })
    }

    /// Supply a meta tag the page would carry
    #[must_use]
    pub fn with_meta(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.meta.insert(name.into(), content.into());
        self
    }

    fn override_url(&self) -> Result<Url> {
        self.page
            .join(OVERRIDE_PATH)
            .map_err(|e| Error::invalid_url(self.page.as_str()).with_source(e))
    }
}

#[async_trait]
impl HostContext for HttpHost {
    fn hostname(&self) -> String {
        self.page.host_str().unwrap_or_default().to_string()
    }

    fn pathname(&self) -> String {
        self.page.path().to_string()
    }

    fn meta_tag(&self, name: &str) -> Option<String> {
        self.meta.get(name).cloned()
    }

    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn env_vars_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        std::env::vars().filter(|(k, _)| k.starts_with(prefix)).collect()
    }

    async fn fetch_override(&self) -> Result<ConfigOverride> {
        let url = self.override_url()?;
        debug!(url = %url, "Fetching runtime override");

        let response = self
            .client
            .get(url.clone())
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| Error::network(format!("Failed to fetch {url}")).with_source(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http_status(status.as_u16(), url.as_str()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::new(ErrorCode::ConnectionFailed, "Failed to read override body").with_source(e))?;

        ConfigOverride::from_json(&body)
            .map_err(Error::from)
            .context(format!("Parsing {url}"))
    }
}
