//! Agent 桥接服务（HTTP）
//!
//! 外部 Agent 通过这些接口读写共享状态、注册受控动作并提议；提议接口会一直挂起到用户作出决定。
//! 启用: cargo run --features web

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::actions::{ActionDescriptor, Decision, DynamicAction, ProposalView};
use crate::agent::AgentChannel;
use crate::canvas::Canvas;
use crate::core::{CanvasError, LogEntry, SessionState};

pub struct ServerState {
    pub canvas: Arc<Canvas>,
    pub agent: AgentChannel,
}

type ApiError = (StatusCode, String);

fn api_error(e: CanvasError) -> ApiError {
    let status = match &e {
        CanvasError::UnknownAction(_) | CanvasError::NoPendingProposal => StatusCode::NOT_FOUND,
        CanvasError::InvalidArguments { .. } => StatusCode::BAD_REQUEST,
        CanvasError::GateBusy(_) | CanvasError::NotExecuting(_) | CanvasError::ReservedAction(_) => {
            StatusCode::CONFLICT
        }
        CanvasError::Withdrawn(_) => StatusCode::GONE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

pub fn router(canvas: Arc<Canvas>) -> Router {
    let state = Arc::new(ServerState {
        agent: canvas.agent_channel(),
        canvas,
    });
    Router::new()
        .route("/health", get(health))
        .route("/api/state", get(api_state_get).put(api_state_put))
        .route("/api/state/logs", post(api_logs_append))
        .route("/api/actions", get(api_actions_list).post(api_actions_register))
        .route("/api/actions/:name/propose", post(api_action_propose))
        .route("/api/proposal", get(api_proposal_current))
        .route("/api/proposal/present", post(api_proposal_present))
        .route("/api/proposal/resolve", post(api_proposal_resolve))
        .with_state(state)
}

/// 监听并服务，cancel 触发后优雅退出
pub async fn serve(canvas: Arc<Canvas>, bind: &str, cancel: CancellationToken) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Agent bridge: http://{}", listener.local_addr()?);
    axum::serve(listener, router(canvas))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "Healthy", "message": "Agent bridge is running." }))
}

async fn api_state_get(State(state): State<Arc<ServerState>>) -> Json<Value> {
    Json(json!({
        "agent": state.agent.name(),
        "revision": state.canvas.store().revision(),
        "state": state.agent.state(),
    }))
}

/// Agent 推送整份状态（后写者胜）
async fn api_state_put(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<SessionState>,
) -> StatusCode {
    state.agent.set_state(body);
    StatusCode::NO_CONTENT
}

async fn api_logs_append(State(state): State<Arc<ServerState>>, Json(entry): Json<LogEntry>) -> StatusCode {
    state.agent.append_log(entry);
    StatusCode::NO_CONTENT
}

async fn api_actions_list(State(state): State<Arc<ServerState>>) -> Json<Vec<ActionDescriptor>> {
    Json(state.agent.actions().await)
}

#[derive(Debug, Deserialize)]
struct RegisterActionRequest {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    parameters: Value,
}

async fn api_actions_register(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<RegisterActionRequest>,
) -> Result<StatusCode, ApiError> {
    if req.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name is required".to_string()));
    }
    let parameters = if req.parameters.is_null() {
        json!({ "type": "object", "properties": {} })
    } else {
        req.parameters
    };
    let action = DynamicAction::new(req.name, req.description, parameters);
    state
        .agent
        .register_action(Arc::new(action))
        .await
        .map_err(api_error)?;
    Ok(StatusCode::CREATED)
}

/// 提议受控动作，挂起直到用户决定，返回 {"decision": "YES" | "NO"}
async fn api_action_propose(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    Json(arguments): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let decision = state.agent.propose(&name, arguments).await.map_err(api_error)?;
    Ok(Json(json!({ "decision": decision })))
}

/// 查看当前提议，不改变状态
async fn api_proposal_current(State(state): State<Arc<ServerState>>) -> Result<Json<ProposalView>, ApiError> {
    state
        .canvas
        .gate()
        .current()
        .await
        .map(Json)
        .ok_or_else(|| api_error(CanvasError::NoPendingProposal))
}

/// 展示当前提议（proposed → executing）
async fn api_proposal_present(State(state): State<Arc<ServerState>>) -> Result<Json<ProposalView>, ApiError> {
    state
        .canvas
        .gate()
        .present()
        .await
        .map(Json)
        .ok_or_else(|| api_error(CanvasError::NoPendingProposal))
}

#[derive(Debug, Deserialize)]
struct ResolveRequest {
    decision: Decision,
}

async fn api_proposal_resolve(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ProposalView>, ApiError> {
    state
        .canvas
        .gate()
        .resolve(req.decision)
        .await
        .map(Json)
        .map_err(api_error)
}
