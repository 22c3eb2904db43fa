use magicsaas_api_client::{ErrorKind, MemoryStore, RouteNavigator, UniversalApiClient};
use magicsaas_api_client::navigation::Navigator;
use magicsaas_runtime_config::overrides::{ApiOverride, TenantOverride};
use magicsaas_runtime_config::{ConfigOverride, ConfigResolver, StaticHost};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

async fn healthcare_client(api_url: &str) -> (UniversalApiClient, Arc<RouteNavigator>) {
    let document = ConfigOverride {
        tenant: Some(TenantOverride {
            id: Some("clinic-42".into()),
            name: None,
        }),
        api: Some(ApiOverride {
            base_url: Some(api_url.to_string()),
            retry_attempts: Some(0),
            ..ApiOverride::default()
        }),
        ..ConfigOverride::default()
    };
    let host = StaticHost::new("localhost")
        .with_path("/petalas/healthcare/agenda")
        .with_override(document);
    let config = ConfigResolver::new(host).resolve().await;

    let navigator = Arc::new(RouteNavigator::new("/petalas/healthcare/agenda"));
    let client = UniversalApiClient::builder(config)
        .store(Arc::new(MemoryStore::new()))
        .navigator(navigator.clone())
        .build()
        .unwrap();
    (client, navigator)
}

#[tokio::test]
async fn test_override_document_drives_requests() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/petalas/healthcare/appointments/a1/cancel")
        .match_header("x-tenant-id", "clinic-42")
        .match_header("x-petala-type", "healthcare")
        .match_header("x-environment", "development")
        .match_header("authorization", "Bearer tok")
        .match_body(Matcher::Json(json!({ "reason": "conflict" })))
        .with_status(200)
        .with_body(r#"{"status":"cancelled"}"#)
        .create_async()
        .await;

    let (client, _) = healthcare_client(&server.url()).await;
    client.session().sign_in("tok", None).unwrap();

    let body = client.appointments().cancel("a1", Some("conflict")).await.unwrap();
    assert_eq!(body["status"], "cancelled");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_expired_session_redirects_once() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/petalas/healthcare/orders/o1/cancel")
        .with_status(401)
        .with_body(r#"{"message":"token expired"}"#)
        .expect(1)
        .create_async()
        .await;

    let (client, navigator) = healthcare_client(&server.url()).await;
    client
        .session()
        .sign_in("stale", Some(&json!({ "id": "u1" })))
        .unwrap();

    let err = client.orders().cancel("o1", "late").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(err.body().unwrap()["message"], "token expired");

    assert!(client.session().token().unwrap().is_none());
    assert!(client.session().user().unwrap().is_none());
    assert_eq!(navigator.current_path(), "/login");
    mock.assert_async().await;
}
