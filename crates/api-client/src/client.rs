//! Main API client implementation

use crate::endpoints::{
    AnalyticsApi, AppointmentsApi, CartApi, CustomersApi, OrdersApi, PaymentsApi, ProductsApi,
    ReviewsApi, SofiaApi,
};
use crate::error::{ApiError, ApiResult, body_value};
use crate::middleware::{attempt_headers, envelope_headers, normalize_path};
use crate::navigation::{Navigator, RouteNavigator};
use crate::request::ApiRequest;
use crate::session::Session;
use crate::storage::{CredentialStore, MemoryStore};
use magicsaas_core::retry::{Attempt, retry_async};
use magicsaas_runtime_config::RuntimeConfig;
use magicsaas_telemetry::{Timer, metrics};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const CLIENT_USER_AGENT: &str = concat!("magicsaas-api-client/", env!("CARGO_PKG_VERSION"));

/// HTTP client scoped to one tenant and one Pétala
///
/// This client wraps `reqwest` and adds:
/// - Tenant, Pétala, environment and version headers on every request
/// - Bearer token from the credential store, read fresh per attempt
/// - Path scoping under the Pétala base path
/// - Session teardown and login redirect on 401
/// - Exponential backoff retry for network failures and 5xx responses
#[derive(Clone)]
pub struct UniversalApiClient {
    inner: Client,
    config: Arc<RuntimeConfig>,
    session: Session,
}

/// Builder for [`UniversalApiClient`]
pub struct ClientBuilder {
    config: Arc<RuntimeConfig>,
    store: Option<Arc<dyn CredentialStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ClientBuilder {
    /// Credential store; defaults to an empty [`MemoryStore`]
    #[must_use]
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Router; defaults to a [`RouteNavigator`] at `/`
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn build(self) -> ApiResult<UniversalApiClient> {
        let config = self.config;
        config
            .validate()
            .map_err(|e| ApiError::config(e.to_string()))?;

        let mut default_headers = envelope_headers(&config)?;
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let inner = Client::builder()
            .timeout(config.api.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ApiError::config(format!("Failed to build HTTP client: {e}")))?;

        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(RouteNavigator::default()));
        let session = Session::new(&config, store, navigator);

        debug!(
            api_url = %config.api_url(),
            petala = %config.petala.petala_type,
            tenant = %config.tenant.id,
            "API client ready"
        );

        Ok(UniversalApiClient {
            inner,
            config,
            session,
        })
    }
}

impl UniversalApiClient {
    /// Client with an in-memory store and router
    pub fn new(config: Arc<RuntimeConfig>) -> ApiResult<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: Arc<RuntimeConfig>) -> ClientBuilder {
        ClientBuilder {
            config,
            store: None,
            navigator: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Absolute URL for a path, scoped under the Pétala base path
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.config.api_url(),
            normalize_path(&self.config.petala.base_path, path)
        )
    }

    // -------------------------------------------------------------------------
    // Resource facades
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn products(&self) -> ProductsApi {
        ProductsApi::new(self.clone())
    }

    #[must_use]
    pub fn cart(&self) -> CartApi {
        CartApi::new(self.clone())
    }

    #[must_use]
    pub fn orders(&self) -> OrdersApi {
        OrdersApi::new(self.clone())
    }

    #[must_use]
    pub fn appointments(&self) -> AppointmentsApi {
        AppointmentsApi::new(self.clone())
    }

    #[must_use]
    pub fn customers(&self) -> CustomersApi {
        CustomersApi::new(self.clone())
    }

    #[must_use]
    pub fn payments(&self) -> PaymentsApi {
        PaymentsApi::new(self.clone())
    }

    #[must_use]
    pub fn reviews(&self) -> ReviewsApi {
        ReviewsApi::new(self.clone())
    }

    #[must_use]
    pub fn analytics(&self) -> AnalyticsApi {
        AnalyticsApi::new(self.clone())
    }

    #[must_use]
    pub fn sofia(&self) -> SofiaApi {
        SofiaApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // HTTP verbs
    // -------------------------------------------------------------------------

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(ApiRequest::get(path)).await
    }

    /// GET with query parameters taken from a serializable struct or map
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ApiResult<T> {
        self.request(ApiRequest::get(path).with_query(query)?).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(ApiRequest::post(path).with_body(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(ApiRequest::put(path).with_body(body)?).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(ApiRequest::patch(path).with_body(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request(ApiRequest::delete(path)).await
    }

    /// Send a request through the full pipeline
    ///
    /// Network failures and 5xx responses are retried up to
    /// `api.retry.retry_attempts` times; the error of the last attempt is
    /// returned unchanged.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path, request_id))]
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let url = self.url_for(&request.path);
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let request = &request;
        let url = url.as_str();
        let request_id = request_id.as_str();

        let outcome = retry_async(&self.config.api.retry, ApiError::is_retryable, move |attempt| {
            self.execute_once::<T>(request, url, request_id, attempt)
        })
        .await;

        match outcome {
            Ok(result) => {
                debug!(
                    attempts = result.attempts,
                    elapsed_ms = result.total_duration.as_millis() as u64,
                    "Request succeeded"
                );
                Ok(result.value)
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!(error = %e, url, "Request failed after retries");
                } else {
                    debug!(error = %e, url, "Request failed");
                }
                Err(e)
            }
        }
    }

    /// One attempt: stamp headers, send, classify the response
    async fn execute_once<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        url: &str,
        request_id: &str,
        attempt: Attempt,
    ) -> ApiResult<T> {
        metrics().increment("api.requests");
        if attempt.is_retry() {
            metrics().increment("api.retries");
        }

        let token = self.session.token()?;
        let mut builder = self
            .inner
            .request(request.method.clone(), url)
            .headers(attempt_headers(request_id, token.as_deref())?);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(attempt = attempt.number(), url, "Sending request");

        let timer = Timer::start("api.latency_ms");
        let response = builder.send().await.map_err(ApiError::from_transport);
        let elapsed = timer.stop();
        let response = response?;

        let status = response.status();
        let raw = response.bytes().await.map_err(ApiError::Network)?;

        debug!(
            attempt = attempt.number(),
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Response received"
        );

        if status.is_success() {
            let raw: &[u8] = if raw.is_empty() { b"null" } else { &raw };
            return serde_json::from_slice(raw).map_err(ApiError::Decode);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.session.reject(status.as_u16());
            return Err(ApiError::Unauthorized {
                body: body_value(&raw),
            });
        }

        Err(ApiError::http(status.as_u16(), &raw))
    }

    /// Send with an explicit method and optional JSON body
    pub async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let mut request = ApiRequest::new(method, path);
        if let Some(body) = body {
            request = request.with_body(body)?;
        }
        self.request(request).await
    }
}
