//! HTTP-level tests for the scene broker.
//!
//! Everything runs in-process against the in-memory queue; no Redis or LLM
//! provider is needed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use scene_broker_core::{
    Action, EnqueueAck, FillError, Instruction, InstructionQueue, MailboxSceneProbe,
    MemoryInstructionQueue, ParameterMap, PreconditionValidator, PromptBroker, QueueStoreError,
    ResponseMailbox, SlotFiller,
};
use scene_broker_server::routes::prompt::NOT_READY_MESSAGE;
use scene_broker_server::{build_router, AppState};

// ── Test app builder ───────────────────────────────────────────

struct MoveFiller;

#[async_trait]
impl SlotFiller for MoveFiller {
    async fn fill(&self, _action: Action, _prompt: &str) -> Result<ParameterMap, FillError> {
        Ok([("prefab", "workbench"), ("direction", "left"), ("value", "2")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect())
    }
}

/// Queue whose store is unreachable.
struct BrokenQueue;

#[async_trait]
impl InstructionQueue for BrokenQueue {
    async fn enqueue(&self, _instruction: &Instruction) -> Result<EnqueueAck, QueueStoreError> {
        Err(QueueStoreError::Connection("connection refused".to_string()))
    }

    async fn dequeue(&self) -> Result<Option<Instruction>, QueueStoreError> {
        Err(QueueStoreError::Connection("connection refused".to_string()))
    }

    async fn len(&self) -> Result<usize, QueueStoreError> {
        Err(QueueStoreError::Connection("connection refused".to_string()))
    }
}

struct TestApp {
    state: AppState,
    queue: Arc<MemoryInstructionQueue>,
}

impl TestApp {
    fn new() -> Self {
        let queue = Arc::new(MemoryInstructionQueue::new());
        let state = AppState::new(queue.clone(), Arc::new(ResponseMailbox::new()))
            .with_settle_delay(Duration::ZERO);
        Self { state, queue }
    }

    fn with_prompt_broker(mut self) -> Self {
        let probe = Arc::new(MailboxSceneProbe::new(self.state.mailbox.clone()));
        let broker = PromptBroker::new(
            PreconditionValidator::new(probe),
            Arc::new(MoveFiller),
            self.queue.clone(),
        );
        self.state = self.state.with_broker(Arc::new(broker));
        self.state.readiness.set(true);
        self
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&b).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = build_router(self.state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        (status, body_json(resp.into_body()).await)
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }
}

async fn body_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

fn scene_report(message: &str) -> Value {
    json!({
        "message": message,
        "current_objects": "engine_stand, workbench",
        "available_prefabs": "turbine_blade, wrench",
    })
}

// ── Explicit commands ──────────────────────────────────────────

#[tokio::test]
async fn test_move_is_delivered_verbatim_then_queue_is_empty() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/set/move",
            json!({"prefab": "workbench", "direction": "right", "value": "3"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app.get("/instruction").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "action": "move",
            "parameters": {"prefab": "workbench", "direction": "right", "value": "3"}
        })
    );

    let (status, body) = app.get("/instruction").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": false, "error": "instruction queue is empty"})
    );
}

#[tokio::test]
async fn test_invalid_direction_is_rejected_and_not_queued() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/set/move",
            json!({"prefab": "workbench", "direction": "up", "value": "3"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("direction is invalid"), "{}", detail);
    assert!(detail.contains("left"));
    assert!(app.queue.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_non_numeric_value_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/set/spawn",
            json!({
                "reference_object": "engine_stand",
                "prefab": "turbine_blade",
                "direction": "left",
                "value": "two"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("value"));
}

#[tokio::test]
async fn test_rotate_accepts_signed_degrees() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/set/rotate",
            json!({"prefab": "wrench", "axis": "y", "value": "-45.5"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["parameters"]["value"], "-45.5");
}

#[tokio::test]
async fn test_commands_are_drained_in_order() {
    let app = TestApp::new();

    app.post("/set/remove", json!({"prefab": "wrench"})).await;
    app.post(
        "/set/snap",
        json!({"snap_point": "socket_a", "prefab": "turbine_blade"}),
    )
    .await;
    app.post(
        "/set/scale",
        json!({"prefab": "workbench", "axis": "x_up", "value": "2"}),
    )
    .await;

    let kinds: Vec<Value> = {
        let mut kinds = Vec::new();
        for _ in 0..3 {
            let (_, body) = app.get("/instruction").await;
            kinds.push(body["action"].clone());
        }
        kinds
    };
    assert_eq!(kinds, vec![json!("remove"), json!("snap"), json!("scale")]);
}

#[tokio::test]
async fn test_unreachable_queue_store_is_service_unavailable() {
    let state = AppState::new(Arc::new(BrokenQueue), Arc::new(ResponseMailbox::new()));
    let app = TestApp {
        state,
        queue: Arc::new(MemoryInstructionQueue::new()),
    };

    let (status, body) = app
        .post(
            "/set/move",
            json!({"prefab": "workbench", "direction": "right", "value": "3"}),
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("connection refused"));

    let (status, body) = app.get("/instruction").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_large_count_is_accepted() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/set/move",
            json!({"prefab": "workbench", "direction": "right", "value": "5000000000"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["parameters"]["value"], "5000000000");
}

// ── Mailbox and readiness ──────────────────────────────────────

#[tokio::test]
async fn test_response_mailbox_keeps_only_latest() {
    let app = TestApp::new();

    let (_, body) = app.get("/response").await;
    assert_eq!(body, json!({"response": null}));

    let (status, echoed) = app.post("/set/response", scene_report("first")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(echoed["response"]["message"], "first");
    app.post("/set/response", scene_report("second")).await;

    let (_, body) = app.get("/response").await;
    assert_eq!(body["response"]["message"], "second");
}

#[tokio::test]
async fn test_llm_status_round_trip() {
    let app = TestApp::new();

    let (_, body) = app.get("/llm_status").await;
    assert_eq!(body, json!({"llmStatus": false}));

    let (_, body) = app.post("/set/llm_status", json!({"status": true})).await;
    assert_eq!(body, json!({"message": "Status updated", "status": true}));

    let (_, body) = app.get("/llm_status").await;
    assert_eq!(body, json!({"llmStatus": true}));
}

// ── Prompt route ───────────────────────────────────────────────

#[tokio::test]
async fn test_prompt_without_broker_reports_not_ready() {
    let app = TestApp::new();
    app.state.readiness.set(true);

    let (status, body) = app
        .post("/set/prompt", json!({"prompt": "move workbench left"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["message"], NOT_READY_MESSAGE);
}

#[tokio::test]
async fn test_prompt_without_keyword_is_answered_before_readiness() {
    let app = TestApp::new();

    let (_, body) = app
        .post("/set/prompt", json!({"prompt": "make it look nicer"}))
        .await;
    assert_eq!(
        body["response"]["message"],
        "Invalid action. Please specify an action."
    );
}

#[tokio::test]
async fn test_prompt_without_keyword_is_invalid_action() {
    let app = TestApp::new().with_prompt_broker();

    let (_, body) = app
        .post("/set/prompt", json!({"prompt": "make it look nicer"}))
        .await;
    assert_eq!(
        body["response"]["message"],
        "Invalid action. Please specify an action."
    );
}

#[tokio::test]
async fn test_prompt_spawn_missing_direction_is_deficient() {
    let app = TestApp::new().with_prompt_broker();
    app.post("/set/response", scene_report("Scene ready")).await;

    let (_, body) = app
        .post(
            "/set/prompt",
            json!({"prompt": "Spawn a turbine_blade next to the engine_stand"}),
        )
        .await;
    assert_eq!(
        body["response"]["message"],
        "Spawn Action: Please specify direction or add one."
    );
    assert!(app.queue.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_prompt_dispatch_answers_with_mailbox() {
    let app = TestApp::new().with_prompt_broker();
    app.post("/set/response", scene_report("Scene ready")).await;

    let (status, body) = app
        .post("/set/prompt", json!({"prompt": "move workbench left 2"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    // No consumer ran during the settle window, so the previous report comes back.
    assert_eq!(body["response"]["message"], "Scene ready");

    let (_, queued) = app.get("/instruction").await;
    assert_eq!(queued["action"], "move");
    assert_eq!(queued["parameters"]["direction"], "left");
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
