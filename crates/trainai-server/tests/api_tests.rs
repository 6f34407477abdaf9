use std::sync::Arc;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};
use async_trait::async_trait;
use mockall::mock;

use trainai_core::{
    CoreError, Flow, FlowId, FlowInput, FlowRepository, FlowSummary, MockDiscoveryService,
};
use trainai_server::{api::build_router, ServerConfig, ToolServer};
use trainai_state_inmemory::InMemoryFlowRepository;

// Mock the flow store
mock! {
    pub FlowStore {}

    #[async_trait]
    impl FlowRepository for FlowStore {
        async fn persist(&self, flow: FlowInput) -> Result<FlowId, CoreError>;
        async fn list(&self) -> Result<Vec<FlowSummary>, CoreError>;
        async fn find_by_id(&self, id: &FlowId) -> Result<Option<Flow>, CoreError>;
        fn backend_name(&self) -> &'static str;
        async fn health_check(&self) -> Result<bool, CoreError>;
    }
}

fn router_with(config: ServerConfig, store: Arc<dyn FlowRepository>) -> Router {
    let server = ToolServer::new(config, store, Arc::new(MockDiscoveryService::new()));
    build_router(Arc::new(server))
}

fn memory_router() -> Router {
    router_with(ServerConfig::default(), Arc::new(InMemoryFlowRepository::new()))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn jira_flow() -> Value {
    json!({
        "app": "jira",
        "task": "create epic",
        "confidence": 0.9,
        "sources": [],
        "steps": [{"selector": "button:has-text('Create')", "action": "click"}],
        "fallbacks": {},
        "role": ["admin"],
        "prerequisites": []
    })
}

#[tokio::test]
async fn test_banner() {
    let app = memory_router();
    let (status, body) = send(&app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Train.ai tool API running");
    assert_eq!(body["flows"], "/flows");
}

#[tokio::test]
async fn test_banner_links_follow_prefix() {
    let config = ServerConfig {
        public_prefix: "/api".to_string(),
        ..Default::default()
    };
    let app = router_with(config, Arc::new(InMemoryFlowRepository::new()));
    let (_, body) = send(&app, get("/")).await;

    assert_eq!(body["flows"], "/api/flows");
    assert_eq!(body["health"], "/api/health");
}

#[tokio::test]
async fn test_persist_then_get_scenario() {
    let app = memory_router();

    let (status, body) = send(&app, post_json("/persist_flow", &jira_flow())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["task"], "create epic");
    let id = body["id"].as_str().expect("id should be a string").to_string();
    assert!(!id.is_empty());

    let (status, flow) = send(&app, get(&format!("/flows/{}", id))).await;
    assert_eq!(status, StatusCode::OK);

    let mut expected = jira_flow();
    expected["id"] = json!(id);
    assert_eq!(flow, expected);
}

#[tokio::test]
async fn test_client_supplied_id_is_ignored() {
    let app = memory_router();
    let mut payload = jira_flow();
    payload["id"] = json!("flow_001");

    let (status, body) = send(&app, post_json("/persist_flow", &payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["id"], "flow_001");

    let (status, _) = send(&app, get("/flows/flow_001")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_roles_stored_once() {
    let app = memory_router();
    let mut payload = jira_flow();
    payload["role"] = json!(["admin", "pm", "admin"]);

    let (status, body) = send(&app, post_json("/persist_flow", &payload)).await;
    assert_eq!(status, StatusCode::OK);

    let id = body["id"].as_str().unwrap().to_string();
    let (_, flow) = send(&app, get(&format!("/flows/{}", id))).await;
    assert_eq!(flow["role"], json!(["admin", "pm"]));
}

#[tokio::test]
async fn test_list_flows_most_recent_first() {
    let app = memory_router();

    let (status, body) = send(&app, get("/flows")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let mut ids = Vec::new();
    for task in ["first", "second", "third"] {
        let mut payload = jira_flow();
        payload["task"] = json!(task);
        let (_, body) = send(&app, post_json("/persist_flow", &payload)).await;
        ids.push(body["id"].clone());
    }

    let (status, body) = send(&app, get("/flows")).await;
    assert_eq!(status, StatusCode::OK);

    let summaries = body.as_array().unwrap();
    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries[0]["task"], "third");
    assert_eq!(summaries[0]["id"], ids[2]);
    assert_eq!(summaries[2]["id"], ids[0]);
    assert_eq!(
        summaries[1],
        json!({"id": ids[1], "app": "jira", "task": "second", "confidence": 0.9})
    );
}

#[tokio::test]
async fn test_unknown_flow_is_404() {
    let app = memory_router();
    let (status, body) = send(&app, get("/flows/does-not-exist")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not found");
    assert_eq!(body["errorDetails"]["errorCode"], "ERR_NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_flow_legacy_status() {
    let config = ServerConfig {
        not_found_compat: true,
        ..Default::default()
    };
    let app = router_with(config, Arc::new(InMemoryFlowRepository::new()));
    let (status, body) = send(&app, get("/flows/does-not-exist")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "not found");
}

#[tokio::test]
async fn test_invalid_payloads_never_reach_store() {
    let mut store = MockFlowStore::new();
    store.expect_persist().never();
    store.expect_backend_name().return_const("mock");
    let app = router_with(ServerConfig::default(), Arc::new(store));

    let mut bad_action = jira_flow();
    bad_action["steps"][0]["action"] = json!("hover");

    let mut bad_confidence = jira_flow();
    bad_confidence["confidence"] = json!(1.5);

    let mut missing_field = jira_flow();
    missing_field.as_object_mut().unwrap().remove("steps");

    let mut missing_value = jira_flow();
    missing_value["steps"] = json!([{"selector": "input[name='summary']", "action": "type"}]);

    let mut nul_in_source = jira_flow();
    nul_in_source["sources"] = json!([{"ref": "pdf://jira_guide#p12", "text": "Epic\u{0}"}]);

    let mut nul_in_app = jira_flow();
    nul_in_app["app"] = json!("ji\u{0}ra");

    for payload in [bad_action, bad_confidence, missing_field, missing_value, nul_in_source, nul_in_app] {
        let (status, body) = send(&app, post_json("/persist_flow", &payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {}", payload);
        assert_eq!(body["errorDetails"]["errorCode"], "ERR_VALIDATION_ERROR");
    }

    let request = Request::builder()
        .method("POST")
        .uri("/persist_flow")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_storage_unavailable_is_503() {
    let mut store = MockFlowStore::new();
    store
        .expect_persist()
        .returning(|_| Err(CoreError::StorageUnavailable("connection refused".to_string())));
    store
        .expect_list()
        .returning(|| Err(CoreError::StorageUnavailable("connection refused".to_string())));
    store
        .expect_find_by_id()
        .returning(|_| Err(CoreError::StorageUnavailable("connection refused".to_string())));
    store.expect_backend_name().return_const("mock");
    let app = router_with(ServerConfig::default(), Arc::new(store));

    let (status, body) = send(&app, post_json("/persist_flow", &jira_flow())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["errorDetails"]["errorCode"], "ERR_STORAGE_UNAVAILABLE");

    let (status, _) = send(&app, get("/flows")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(&app, get("/flows/abc")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_crawl_echoes_url() {
    let app = memory_router();

    let request = Request::builder()
        .method("POST")
        .uri("/crawl?url=https%3A%2F%2Facme.atlassian.net&depth=3")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://acme.atlassian.net");
    assert_eq!(body["routes"].as_array().unwrap().len(), 2);
    assert_eq!(body["selectors"][0], "button:has-text('Create')");
    assert_eq!(body["screenshots"], json!([]));

    // depth defaults to 1
    let request = Request::builder()
        .method("POST")
        .uri("/crawl?url=http%3A%2F%2Flocalhost")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "http://localhost");
}

#[tokio::test]
async fn test_crawl_requires_url() {
    let app = memory_router();

    let request = Request::builder()
        .method("POST")
        .uri("/crawl?depth=2")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorDetails"]["errorCode"], "ERR_VALIDATION_ERROR");

    let request = Request::builder()
        .method("POST")
        .uri("/crawl?url=x&depth=deep")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_doc_search() {
    let app = memory_router();

    let (status, body) = send(&app, get("/doc_search?query=epic")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["ref"], "pdf://jira_guide#p12");

    let (status, _) = send(&app, get("/doc_search")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_evaluate() {
    let app = memory_router();

    let (status, body) = send(&app, get("/evaluate?selector=input%5Bname%3D%27summary%27%5D")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"valid": true, "notes": "mock evaluation"}));

    let (_, body) = send(
        &app,
        get("/evaluate?selector=INPUT%5Bname%3D%27summary%27%5D&route=%2Fprojects%2FABC%2Fissues"),
    )
    .await;
    assert_eq!(body["valid"], false);

    let (status, _) = send(&app, get("/evaluate?route=%2F")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = memory_router();
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["dependencies"]["flowStore"]["backend"], "memory");

    let mut store = MockFlowStore::new();
    store
        .expect_health_check()
        .returning(|| Err(CoreError::StorageUnavailable("down".to_string())));
    store.expect_backend_name().return_const("mock");
    let app = router_with(ServerConfig::default(), Arc::new(store));

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["dependencies"]["flowStore"]["status"], "DOWN");
}

#[tokio::test]
async fn test_health_degraded_store_is_not_up() {
    let mut store = MockFlowStore::new();
    store.expect_health_check().returning(|| Ok(false));
    store.expect_backend_name().return_const("mock");
    let app = router_with(ServerConfig::default(), Arc::new(store));

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "DOWN");
    assert_eq!(body["dependencies"]["flowStore"]["status"], "DEGRADED");
}
