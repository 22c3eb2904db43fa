//! Cart API endpoints

use crate::client::UniversalApiClient;
use crate::endpoints::common::segment;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Clone)]
pub struct CartApi {
    client: UniversalApiClient,
}

impl CartApi {
    pub(crate) fn new(client: UniversalApiClient) -> Self {
        Self { client }
    }

    /// GET `cart`
    pub async fn get(&self) -> ApiResult<Cart> {
        self.client.get("cart").await
    }

    /// POST `cart/add`
    pub async fn add(&self, item: &AddToCart) -> ApiResult<Cart> {
        self.client.post("cart/add", item).await
    }

    /// PUT `cart/items/:id`
    pub async fn update_item(&self, item_id: &str, quantity: u32) -> ApiResult<Cart> {
        self.client
            .put(&format!("cart/items/{}", segment(item_id)), &json!({ "quantity": quantity }))
            .await
    }

    /// DELETE `cart/items/:id`
    pub async fn remove_item(&self, item_id: &str) -> ApiResult<Cart> {
        self.client.delete(&format!("cart/items/{}", segment(item_id))).await
    }

    /// DELETE `cart`
    pub async fn clear(&self) -> ApiResult<Value> {
        self.client.delete("cart").await
    }

    /// POST `cart/coupon`
    pub async fn apply_coupon(&self, code: &str) -> ApiResult<Cart> {
        self.client.post("cart/coupon", &json!({ "code": code })).await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: String,
    pub quantity: u32,
    /// Size, colour or other variant selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<Value>,
}

impl AddToCart {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            variant: None,
        }
    }

    #[must_use]
    pub fn with_variant(mut self, variant: Value) -> Self {
        self.variant = Some(variant);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub product_id: String,
    pub quantity: u32,
    pub price: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub subtotal: Option<f64>,
    pub discount: Option<f64>,
    pub total: Option<f64>,
    pub coupon: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cart {
    /// Sum of item quantities
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::test_support::client_for;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_add_and_update() {
        let mut server = mockito::Server::new_async().await;
        let add = server
            .mock("POST", "/petalas/fashion/cart/add")
            .match_body(Matcher::Json(json!({ "productId": "p1", "quantity": 2, "variant": { "size": "M" } })))
            .with_status(200)
            .with_body(r#"{"items":[{"id":"i1","productId":"p1","quantity":2}],"total":99.8}"#)
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/petalas/fashion/cart/items/i1")
            .match_body(Matcher::Json(json!({ "quantity": 3 })))
            .with_status(200)
            .with_body(r#"{"items":[{"id":"i1","productId":"p1","quantity":3}]}"#)
            .create_async()
            .await;

        let cart_api = client_for(&server.url()).cart();
        let cart = cart_api
            .add(&AddToCart::new("p1", 2).with_variant(json!({ "size": "M" })))
            .await
            .unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total, Some(99.8));

        let cart = cart_api.update_item("i1", 3).await.unwrap();
        assert_eq!(cart.item_count(), 3);

        add.assert_async().await;
        update.assert_async().await;
    }

    #[tokio::test]
    async fn test_clear_and_coupon() {
        let mut server = mockito::Server::new_async().await;
        let clear = server
            .mock("DELETE", "/petalas/fashion/cart")
            .with_status(204)
            .create_async()
            .await;
        let coupon = server
            .mock("POST", "/petalas/fashion/cart/coupon")
            .match_body(Matcher::Json(json!({ "code": "SUMMER10" })))
            .with_status(422)
            .with_body(r#"{"error":"expired coupon"}"#)
            .create_async()
            .await;

        let cart_api = client_for(&server.url()).cart();
        assert_eq!(cart_api.clear().await.unwrap(), Value::Null);

        let err = cart_api.apply_coupon("SUMMER10").await.unwrap_err();
        assert_eq!(err.status(), Some(422));

        clear.assert_async().await;
        coupon.assert_async().await;
    }
}
