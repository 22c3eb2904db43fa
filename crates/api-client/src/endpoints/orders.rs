//! Orders API endpoints

use crate::client::UniversalApiClient;
use crate::endpoints::common::{Address, ListParams, Paginated, segment};
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Clone)]
pub struct OrdersApi {
    client: UniversalApiClient,
}

impl OrdersApi {
    pub(crate) fn new(client: UniversalApiClient) -> Self {
        Self { client }
    }

    /// GET `orders`
    pub async fn list(&self, params: &ListParams) -> ApiResult<Paginated<Order>> {
        self.client.get_with_query("orders", params).await
    }

    /// GET `orders/:id`
    pub async fn get(&self, id: &str) -> ApiResult<Order> {
        self.client.get(&format!("orders/{}", segment(id))).await
    }

    /// POST `orders`
    pub async fn create(&self, order: &CreateOrder) -> ApiResult<Order> {
        self.client.post("orders", order).await
    }

    /// PUT `orders/:id/cancel` with `{ "reason": ... }`
    ///
    /// The server's body is returned as-is.
    pub async fn cancel(&self, id: &str, reason: &str) -> ApiResult<Value> {
        self.client
            .put(&format!("orders/{}/cancel", segment(id)), &json!({ "reason": reason }))
            .await
    }

    /// GET `orders/:id/tracking`
    pub async fn tracking(&self, id: &str) -> ApiResult<Tracking> {
        self.client.get(&format!("orders/{}/tracking", segment(id))).await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    /// Empty means "order the current cart"
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub status: String,
    pub total: Option<f64>,
    pub currency: Option<String>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub status: String,
    pub at: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracking {
    pub order_id: Option<String>,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub events: Vec<TrackingEvent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
