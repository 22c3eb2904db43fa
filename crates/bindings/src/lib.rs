//! Observable load/error/data state around API calls
//!
//! [`use_api`] wraps a facade call in an [`ApiResource`]: a
//! `tokio::sync::watch` channel holding `{ data, loading, error }` that UI
//! code can subscribe to. [`use_mutation`] does the same for calls that take
//! an argument and only run on demand.
//!
//! Calls against the same resource are not de-duplicated or cancelled. Two
//! overlapping `execute()` calls both run to completion and whichever
//! finishes last owns `data`/`error`.
//!
//! # Example
//!
//! ```rust,no_run
//! use magicsaas_api_client::UniversalApiClient;
//! use magicsaas_bindings::{UseApiOptions, use_api};
//!
//! # async fn demo(client: UniversalApiClient) {
//! let products = client.products();
//! let featured = use_api(
//!     move || {
//!         let products = products.clone();
//!         async move { products.featured(Some(8)).await }
//!     },
//!     UseApiOptions::default(),
//! );
//!
//! let mut updates = featured.subscribe();
//! let state = updates.wait_for(|s| !s.loading).await.unwrap().clone();
//! if state.is_success() {
//!     println!("{} featured products", state.data.unwrap().len());
//! }
//! # }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use futures::FutureExt;
use futures::future::BoxFuture;
use magicsaas_api_client::{ApiError, ApiResult};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Snapshot of a resource
#[derive(Debug, Clone)]
pub struct ResourceState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<Arc<ApiError>>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> ResourceState<T> {
    /// Settled with data and no error
    pub fn is_success(&self) -> bool {
        !self.loading && self.error.is_none() && self.data.is_some()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Options for [`use_api`]
#[derive(Debug, Clone, Copy)]
pub struct UseApiOptions {
    /// Start the first execution right away (default `true`)
    pub immediate: bool,
}

impl Default for UseApiOptions {
    fn default() -> Self {
        Self { immediate: true }
    }
}

impl UseApiOptions {
    pub fn deferred() -> Self {
        Self { immediate: false }
    }
}

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, ApiResult<T>> + Send + Sync>;
type Mutator<A, T> = Arc<dyn Fn(A) -> BoxFuture<'static, ApiResult<T>> + Send + Sync>;

/// Shared state cell; clones observe and write the same state
struct StateCell<T> {
    tx: Arc<watch::Sender<ResourceState<T>>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T: Clone + Send + Sync + 'static> StateCell<T> {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(ResourceState::default());
        Self { tx: Arc::new(tx) }
    }

    async fn run(&self, call: BoxFuture<'static, ApiResult<T>>) -> Result<T, Arc<ApiError>> {
        self.tx.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        match call.await {
            Ok(data) => {
                self.tx.send_modify(|s| {
                    s.data = Some(data.clone());
                    s.error = None;
                    s.loading = false;
                });
                Ok(data)
            }
            Err(e) => {
                let e = Arc::new(e);
                debug!(error = %e, "API resource failed");
                self.tx.send_modify(|s| {
                    s.error = Some(e.clone());
                    s.loading = false;
                });
                Err(e)
            }
        }
    }

    fn snapshot(&self) -> ResourceState<T> {
        self.tx.borrow().clone()
    }

    fn reset(&self) {
        self.tx.send_replace(ResourceState::default());
    }
}

/// Load/error/data state for a call without arguments
pub struct ApiResource<T> {
    cell: StateCell<T>,
    fetcher: Fetcher<T>,
}

impl<T> Clone for ApiResource<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            fetcher: self.fetcher.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ApiResource<T> {
    /// Run the call, updating the state before and after
    pub async fn execute(&self) -> Result<T, Arc<ApiError>> {
        self.cell.run((self.fetcher)()).await
    }

    /// Current snapshot
    pub fn state(&self) -> ResourceState<T> {
        self.cell.snapshot()
    }

    pub fn data(&self) -> Option<T> {
        self.cell.tx.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.cell.tx.borrow().loading
    }

    pub fn error(&self) -> Option<Arc<ApiError>> {
        self.cell.tx.borrow().error.clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.cell.tx.subscribe()
    }

    /// Back to `{ data: None, loading: false, error: None }`
    ///
    /// A call still in flight will write its result when it completes.
    pub fn reset(&self) {
        self.cell.reset();
    }
}

/// Wrap `fetcher` in an [`ApiResource`]
///
/// With `immediate`, the first execution is spawned on the current tokio
/// runtime and `loading` is already `true` when this returns. Outside a
/// runtime nothing is spawned and the resource stays idle.
pub fn use_api<T, F, Fut>(fetcher: F, options: UseApiOptions) -> ApiResource<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
{
    let resource = ApiResource {
        cell: StateCell::new(),
        fetcher: Arc::new(move || fetcher().boxed()),
    };

    if options.immediate {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                resource.cell.tx.send_modify(|s| s.loading = true);
                let spawned = resource.clone();
                handle.spawn(async move {
                    // The outcome is published through the state
                    let _ = spawned.execute().await;
                });
            }
            Err(_) => warn!("use_api called outside a tokio runtime, not executing immediately"),
        }
    }

    resource
}

/// Load/error/data state for a call that takes an argument
pub struct ApiMutation<A, T> {
    cell: StateCell<T>,
    mutator: Mutator<A, T>,
}

impl<A, T> Clone for ApiMutation<A, T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            mutator: self.mutator.clone(),
        }
    }
}

impl<A, T: Clone + Send + Sync + 'static> ApiMutation<A, T> {
    pub async fn mutate(&self, arg: A) -> Result<T, Arc<ApiError>> {
        self.cell.run((self.mutator)(arg)).await
    }

    pub fn state(&self) -> ResourceState<T> {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.cell.tx.subscribe()
    }

    pub fn reset(&self) {
        self.cell.reset();
    }
}

/// Wrap a one-argument call (create, update, cancel...) in an [`ApiMutation`]
pub fn use_mutation<A, T, F, Fut>(mutator: F) -> ApiMutation<A, T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
{
    ApiMutation {
        cell: StateCell::new(),
        mutator: Arc::new(move |arg| mutator(arg).boxed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magicsaas_api_client::UniversalApiClient;
    use magicsaas_core::retry::RetryConfig;
    use magicsaas_runtime_config::resolver::compute_defaults;
    use magicsaas_runtime_config::{ResolverOptions, StaticHost};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn counting_fetcher(
        calls: Arc<AtomicU32>,
    ) -> impl Fn() -> BoxFuture<'static, ApiResult<u32>> + Send + Sync + 'static {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok(n) }.boxed()
        }
    }

    #[tokio::test]
    async fn test_immediate_execution() {
        let calls = Arc::new(AtomicU32::new(0));
        let resource = use_api(counting_fetcher(calls.clone()), UseApiOptions::default());
        assert!(resource.is_loading());

        let mut rx = resource.subscribe();
        let state = rx.wait_for(|s| !s.loading).await.unwrap().clone();

        assert!(state.is_success());
        assert_eq!(state.data, Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deferred_execution() {
        let calls = Arc::new(AtomicU32::new(0));
        let resource = use_api(counting_fetcher(calls.clone()), UseApiOptions::deferred());

        tokio::task::yield_now().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!resource.is_loading());
        assert!(!resource.state().is_success());

        assert_eq!(resource.execute().await.unwrap(), 1);
        assert_eq!(resource.execute().await.unwrap(), 2);
        assert_eq!(resource.data(), Some(2));
    }

    #[test]
    fn test_outside_runtime_stays_idle() {
        let calls = Arc::new(AtomicU32::new(0));
        let resource = use_api(counting_fetcher(calls.clone()), UseApiOptions::default());
        assert!(!resource.is_loading());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_state() {
        let resource = use_api(
            || async { Err::<u32, _>(ApiError::http(404, br#"{"error":"missing"}"#)) },
            UseApiOptions::deferred(),
        );

        let err = resource.execute().await.unwrap_err();
        assert_eq!(err.status(), Some(404));

        let state = resource.state();
        assert!(state.is_error());
        assert!(!state.is_success());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let resource = use_api(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(ApiError::http(503, b""))
                    } else {
                        Ok(n)
                    }
                }
            },
            UseApiOptions::deferred(),
        );

        assert!(resource.execute().await.is_err());
        assert!(resource.state().is_error());

        resource.execute().await.unwrap();
        assert!(resource.state().is_success());
        assert!(resource.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_executes_last_write_wins() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let resource = use_api(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                // The first call is the slow one
                let delay = if n == 1 { 50 } else { 10 };
                async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    Ok(n)
                }
            },
            UseApiOptions::deferred(),
        );

        let (first, second) = tokio::join!(resource.execute(), resource.execute());

        assert_eq!(first.unwrap(), 1);
        assert_eq!(second.unwrap(), 2);
        assert_eq!(resource.data(), Some(1));
    }

    #[tokio::test]
    async fn test_reset() {
        let calls = Arc::new(AtomicU32::new(0));
        let resource = use_api(counting_fetcher(calls), UseApiOptions::deferred());
        resource.execute().await.unwrap();

        resource.reset();
        let state = resource.state();
        assert!(state.data.is_none());
        assert!(!state.loading);
        assert!(!state.is_error());
    }

    #[tokio::test]
    async fn test_mutation() {
        let double = use_mutation(|x: u32| async move { Ok(x * 2) });
        assert!(double.state().data.is_none());

        assert_eq!(double.mutate(21).await.unwrap(), 42);
        assert_eq!(double.state().data, Some(42));
    }

    #[tokio::test]
    async fn test_binds_facade_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/petalas/fashion/products/featured")
            .with_status(200)
            .with_body(r#"[{"id":"p1","name":"Linen Shirt"}]"#)
            .create_async()
            .await;

        let config = compute_defaults(&StaticHost::new("fashion.magicsaas.com"), &ResolverOptions::default())
            .with_api_url(server.url())
            .with_retry(RetryConfig::no_retry());
        let client = UniversalApiClient::new(Arc::new(config)).unwrap();

        let products = client.products();
        let featured = use_api(
            move || {
                let products = products.clone();
                async move { products.featured(None).await }
            },
            UseApiOptions::default(),
        );

        let mut rx = featured.subscribe();
        let state = rx.wait_for(|s| !s.loading).await.unwrap().clone();
        assert_eq!(state.data.unwrap()[0].name, "Linen Shirt");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_cancel_order_mutation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/petalas/fashion/orders/order-1/cancel")
            .with_status(500)
            .create_async()
            .await;

        let config = compute_defaults(&StaticHost::new("fashion.magicsaas.com"), &ResolverOptions::default())
            .with_api_url(server.url())
            .with_retry(RetryConfig::no_retry());
        let orders = UniversalApiClient::new(Arc::new(config)).unwrap().orders();

        let cancel = use_mutation(move |id: String| {
            let orders = orders.clone();
            async move { orders.cancel(&id, "changed mind").await }
        });

        let err = cancel.mutate("order-1".to_string()).await.unwrap_err();
        assert!(err.is_server_error());
        assert!(cancel.state().is_error());
        mock.assert_async().await;
    }
}
