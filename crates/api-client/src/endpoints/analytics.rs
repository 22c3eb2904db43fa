//! Analytics API endpoints
//!
//! Tracking calls go out regardless of `features.analytics`; callers decide
//! whether to track.

use crate::client::UniversalApiClient;
use crate::error::ApiResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone)]
pub struct AnalyticsApi {
    client: UniversalApiClient,
}

impl AnalyticsApi {
    pub(crate) fn new(client: UniversalApiClient) -> Self {
        Self { client }
    }

    /// POST `analytics/events`
    pub async fn track_event(&self, event: &TrackedEvent) -> ApiResult<Value> {
        self.client.post("analytics/events", event).await
    }

    /// POST `analytics/pageview`
    pub async fn page_view(&self, path: &str, referrer: Option<&str>) -> ApiResult<Value> {
        let view = PageView {
            path: path.to_string(),
            referrer: referrer.map(str::to_string),
            timestamp: Utc::now().to_rfc3339(),
        };
        self.client.post("analytics/pageview", &view).await
    }

    /// GET `analytics/dashboard`
    pub async fn dashboard(&self, period: Option<&str>) -> ApiResult<Dashboard> {
        self.client
            .get_with_query("analytics/dashboard", &serde_json::json!({ "period": period }))
            .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEvent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    pub timestamp: String,
}

impl TrackedEvent {
    /// Event stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Map::new(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageView {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    referrer: Option<String>,
    timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub period: Option<String>,
    pub revenue: Option<f64>,
    pub orders: Option<u64>,
    pub visitors: Option<u64>,
    pub conversion_rate: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
