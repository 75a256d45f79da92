//! Agent 通道：外部 Agent 以名字订阅同一份 SessionState
//!
//! Agent 与界面读写的是同一个对象；另有受控动作的注册 / 提议通道。
//! 提议会一直挂起到用户决定；批准后的实际修改（如 batch_delete）由 Agent 自己完成。

use std::sync::Arc;

use serde_json::{json, Value};

use crate::actions::{ActionDescriptor, ConfirmationGate, Decision, GatedAction, DELETE_RESOURCES};
use crate::core::{CanvasError, LogEntry, SessionState};
use crate::session::{ResourceManager, StateStore};

#[derive(Clone)]
pub struct AgentChannel {
    name: String,
    store: StateStore,
    resources: ResourceManager,
    gate: Arc<ConfirmationGate>,
}

impl AgentChannel {
    pub fn new(name: impl Into<String>, store: StateStore, gate: Arc<ConfirmationGate>) -> Self {
        Self {
            name: name.into(),
            resources: ResourceManager::new(store.clone()),
            store,
            gate,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SessionState {
        self.store.read()
    }

    /// Agent 推送的整份状态，直接替换（后写者胜）；model 在会话开始时确定，沿用当前值
    pub fn set_state(&self, mut state: SessionState) {
        let model = self.store.read().model_identifier;
        if state.model_identifier != model {
            if !state.model_identifier.is_empty() {
                tracing::warn!(agent = %self.name, pushed = %state.model_identifier, model = %model, "ignoring model change from agent");
            }
            state.model_identifier = model;
        }
        self.store.write(state);
        tracing::debug!(agent = %self.name, revision = self.store.revision(), "agent pushed state");
    }

    /// 读最新状态、修改、整份写回
    pub fn update(&self, f: impl FnOnce(&mut SessionState)) {
        let mut state = self.store.read();
        f(&mut state);
        self.set_state(state);
    }

    /// 追加一条进度日志
    pub fn append_log(&self, entry: LogEntry) {
        self.update(|state| state.progress_log.push(entry));
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub async fn register_action(&self, action: Arc<dyn GatedAction>) -> Result<(), CanvasError> {
        self.gate.register(action).await
    }

    pub async fn unregister_action(&self, name: &str) -> bool {
        self.gate.unregister(name).await
    }

    pub async fn actions(&self) -> Vec<ActionDescriptor> {
        self.gate.actions().await
    }

    /// 提议受控动作并等待用户决定
    pub async fn propose(&self, name: &str, arguments: Value) -> Result<Decision, CanvasError> {
        tracing::info!(agent = %self.name, action = %name, "agent proposing gated action");
        let ticket = self.gate.propose(name, arguments).await?;
        ticket.decision().await
    }

    /// 请求删除资源：用户批准后由 Agent 执行 batch_delete，拒绝则什么都不改
    pub async fn request_resource_deletion(&self, urls: Vec<String>) -> Result<Decision, CanvasError> {
        let decision = self.propose(DELETE_RESOURCES, json!({ "urls": urls })).await?;
        if decision.is_approved() {
            self.resources.batch_delete(&urls);
        }
        Ok(decision)
    }
}
