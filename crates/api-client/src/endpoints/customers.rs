//! Customer account endpoints, all under `customers/me`

use crate::client::UniversalApiClient;
use crate::endpoints::common::{Address, segment};
use crate::endpoints::products::Product;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Clone)]
pub struct CustomersApi {
    client: UniversalApiClient,
}

impl CustomersApi {
    pub(crate) fn new(client: UniversalApiClient) -> Self {
        Self { client }
    }

    pub async fn profile(&self) -> ApiResult<Customer> {
        self.client.get("customers/me").await
    }

    pub async fn update_profile(&self, changes: &ProfileUpdate) -> ApiResult<Customer> {
        self.client.patch("customers/me", changes).await
    }

    pub async fn addresses(&self) -> ApiResult<Vec<Address>> {
        self.client.get("customers/me/addresses").await
    }

    pub async fn add_address(&self, address: &Address) -> ApiResult<Address> {
        self.client.post("customers/me/addresses", address).await
    }

    pub async fn wishlist(&self) -> ApiResult<Vec<Product>> {
        self.client.get("customers/me/wishlist").await
    }

    pub async fn add_to_wishlist(&self, product_id: &str) -> ApiResult<Value> {
        self.client
            .post("customers/me/wishlist", &json!({ "productId": product_id }))
            .await
    }

    pub async fn remove_from_wishlist(&self, product_id: &str) -> ApiResult<Value> {
        self.client
            .delete(&format!("customers/me/wishlist/{}", segment(product_id)))
            .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Value>,
}
