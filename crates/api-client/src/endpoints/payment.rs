//! Payment API endpoints
//!
//! Intents are created server-side; the publishable key for the browser
//! side lives in `RuntimeConfig::integrations.payments`.

use crate::client::UniversalApiClient;
use crate::endpoints::common::segment;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Clone)]
pub struct PaymentsApi {
    client: UniversalApiClient,
}

impl PaymentsApi {
    pub(crate) fn new(client: UniversalApiClient) -> Self {
        Self { client }
    }

    /// POST `payments/intent`
    pub async fn create_intent(&self, request: &IntentRequest) -> ApiResult<PaymentIntent> {
        self.client.post("payments/intent", request).await
    }

    /// POST `payments/:id/confirm`
    pub async fn confirm(&self, intent_id: &str, payment_method_id: Option<&str>) -> ApiResult<PaymentIntent> {
        self.client
            .post(
                &format!("payments/{}/confirm", segment(intent_id)),
                &json!({ "paymentMethodId": payment_method_id }),
            )
            .await
    }

    /// GET `payments/methods`
    pub async fn methods(&self) -> ApiResult<Vec<PaymentMethod>> {
        self.client.get("payments/methods").await
    }

    /// POST `payments/:id/refund`; `None` refunds the full amount
    pub async fn refund(&self, payment_id: &str, amount: Option<f64>) -> ApiResult<Value> {
        self.client
            .post(&format!("payments/{}/refund", segment(payment_id)), &json!({ "amount": amount }))
            .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    pub status: String,
    pub client_secret: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::test_support::client_for;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_intent_then_confirm() {
        let mut server = mockito::Server::new_async().await;
        let intent = server
            .mock("POST", "/petalas/fashion/payments/intent")
            .match_body(Matcher::Json(json!({ "orderId": "o1" })))
            .with_status(200)
            .with_body(r#"{"id":"pi_1","status":"requires_confirmation","clientSecret":"sec"}"#)
            .create_async()
            .await;
        let confirm = server
            .mock("POST", "/petalas/fashion/payments/pi_1/confirm")
            .match_body(Matcher::Json(json!({ "paymentMethodId": "pm_card" })))
            .with_status(200)
            .with_body(r#"{"id":"pi_1","status":"succeeded"}"#)
            .create_async()
            .await;

        let api = client_for(&server.url()).payments();
        let created = api
            .create_intent(&IntentRequest {
                order_id: "o1".into(),
                amount: None,
                currency: None,
            })
            .await
            .unwrap();
        assert_eq!(created.client_secret.as_deref(), Some("sec"));

        let confirmed = api.confirm(&created.id, Some("pm_card")).await.unwrap();
        assert_eq!(confirmed.status, "succeeded");

        intent.assert_async().await;
        confirm.assert_async().await;
    }

    #[tokio::test]
    async fn test_methods_and_refund() {
        let mut server = mockito::Server::new_async().await;
        let methods = server
            .mock("GET", "/petalas/fashion/payments/methods")
            .with_status(200)
            .with_body(r#"[{"id":"pm_pix","type":"pix"},{"id":"pm_card","type":"card","label":"Visa 4242"}]"#)
            .create_async()
            .await;
        let refund = server
            .mock("POST", "/petalas/fashion/payments/pay_1/refund")
            .match_body(Matcher::Json(json!({ "amount": 10.0 })))
            .with_status(200)
            .with_body(r#"{"refunded":10.0}"#)
            .create_async()
            .await;

        let api = client_for(&server.url()).payments();
        let available = api.methods().await.unwrap();
        assert_eq!(available[0].kind, "pix");
        assert_eq!(api.refund("pay_1", Some(10.0)).await.unwrap()["refunded"], 10.0);

        methods.assert_async().await;
        refund.assert_async().await;
    }
}
