mod common;

use common::serve_once;
use contentful_audit::management::ManagementClient;
use contentful_audit_core::config::{Credentials, SpaceRef};
use contentful_audit_core::contract::ManagementApi;
use contentful_audit_core::http::HttpStatusError;
use serde_json::{json, Value};

fn credentials() -> Credentials {
    Credentials::new(SpaceRef::new("space-1", "master"), "cma-token")
}

#[tokio::test]
async fn entry_is_fetched_with_management_token() {
    let (base_url, request) = serve_once(
        200,
        r#"{"sys": {"id": "page-1", "version": 9, "publishedVersion": 8}, "fields": {"slug": {"en-US": "home"}}}"#,
    )
    .await;
    let client = ManagementClient::new(&base_url, credentials());

    let entry = client.entry("page-1").await.expect("entry decodes");
    assert_eq!(entry.sys.version, Some(9));
    assert_eq!(entry.sys.published_version, Some(8));

    let request = request.await.expect("listener finished");
    assert_eq!(request.method, "GET");
    assert_eq!(request.path(), "/spaces/space-1/environments/master/entries/page-1");
    assert_eq!(request.header("authorization"), Some("Bearer cma-token"));
}

#[tokio::test]
async fn update_puts_all_fields_with_version_header() {
    let (base_url, request) = serve_once(
        200,
        r#"{"sys": {"id": "article-1", "version": 8}, "fields": {"title": {"en-US": "A"}}}"#,
    )
    .await;
    let client = ManagementClient::new(&base_url, credentials());
    let fields = json!({"title": {"en-US": "A"}, "content": {"en-US": {"nodeType": "document", "data": {}, "content": []}}});

    let updated = client
        .update_entry("article-1", 7, fields.as_object().expect("object"))
        .await
        .expect("update accepted");
    assert_eq!(updated.sys.version, Some(8));

    let request = request.await.expect("listener finished");
    assert_eq!(request.method, "PUT");
    assert_eq!(request.path(), "/spaces/space-1/environments/master/entries/article-1");
    assert_eq!(request.header("authorization"), Some("Bearer cma-token"));
    assert_eq!(request.header("x-contentful-version"), Some("7"));
    assert_eq!(
        request.header("content-type"),
        Some("application/vnd.contentful.management.v1+json")
    );
    let body: Value = serde_json::from_str(&request.body).expect("JSON body");
    assert_eq!(body, json!({ "fields": fields }));
}

#[tokio::test]
async fn content_types_are_listed_with_limit() {
    let (base_url, request) = serve_once(
        200,
        r#"{"total": 1, "items": [{"sys": {"id": "page"}, "name": "Page", "fields": [{"id": "slug", "type": "Symbol"}]}]}"#,
    )
    .await;
    let client = ManagementClient::new(&base_url, credentials());

    let content_types = client.content_types().await.expect("listing decodes");
    assert_eq!(content_types.len(), 1);
    assert_eq!(content_types[0].id(), "page");
    assert_eq!(content_types[0].name, "Page");

    let request = request.await.expect("listener finished");
    assert_eq!(request.path(), "/spaces/space-1/environments/master/content_types");
    assert_eq!(request.query_value("limit").as_deref(), Some("1000"));
}

#[tokio::test]
async fn rejected_update_carries_status_and_body() {
    let (base_url, request) =
        serve_once(409, r#"{"sys": {"type": "Error", "id": "VersionMismatch"}}"#).await;
    let client = ManagementClient::new(&base_url, credentials());

    let err = client
        .update_entry("article-1", 3, &serde_json::Map::new())
        .await
        .expect_err("409 is an error");
    let status = err
        .downcast_ref::<HttpStatusError>()
        .expect("error is an HttpStatusError");
    assert_eq!(status.status.as_u16(), 409);
    assert!(status.url.ends_with("/entries/article-1"));
    assert!(status.body.contains("VersionMismatch"));
    request.await.expect("listener finished");
}
