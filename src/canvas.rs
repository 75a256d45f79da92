//! 画布会话：把共享状态、资源管理、确认网关、副作用分发与导出组装到一起
//!
//! 人工编辑一律「读最新状态 → 改一个字段 → 整份写回」。会话结束时调用 shutdown 停止后台任务。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::actions::{ActionRegistry, ConfirmationGate, DeleteResourcesAction};
use crate::agent::AgentChannel;
use crate::backend::{BackendClient, HttpBackend};
use crate::catalog::DocumentCatalog;
use crate::config::AppConfig;
use crate::core::{DocumentSelection, SessionState};
use crate::dispatch::SideEffectDispatcher;
use crate::events::CanvasEvent;
use crate::export::Exporter;
use crate::session::{project, ProgressView, ResourceManager, StateStore};

pub struct Canvas {
    agent_name: String,
    store: StateStore,
    resources: ResourceManager,
    gate: Arc<ConfirmationGate>,
    dispatcher: SideEffectDispatcher,
    catalog: DocumentCatalog,
    exporter: Exporter,
    events: broadcast::Sender<CanvasEvent>,
    shutdown: CancellationToken,
}

impl Canvas {
    /// 使用 reqwest 后端创建（需在 tokio 运行时内调用）
    pub fn from_config(cfg: &AppConfig) -> Self {
        let backend = Arc::new(HttpBackend::new(&cfg.backend.base_url, cfg.backend.timeout_secs));
        Self::new(cfg, backend)
    }

    pub fn new(cfg: &AppConfig, backend: Arc<dyn BackendClient>) -> Self {
        let store = StateStore::new(cfg.app.model.clone());
        let (events, _) = broadcast::channel(64);
        let shutdown = CancellationToken::new();

        // DeleteResources 由画布一侧注册，默认禁用自动执行：只能经由确认网关
        let mut registry = ActionRegistry::new();
        registry.register(DeleteResourcesAction);
        let gate = Arc::new(ConfirmationGate::new(registry, store.clone(), events.clone()));

        let exporter = Exporter::new(
            backend.clone(),
            cfg.backend.download_dir.clone(),
            cfg.backend.pdf_file_name.clone(),
            cfg.codelabs.viewer_url.clone(),
            events.clone(),
        );
        let dispatcher = SideEffectDispatcher::spawn(backend, shutdown.child_token());

        tracing::info!(agent = %cfg.app.agent_name, model = %cfg.app.model, "canvas session started");
        Self {
            agent_name: cfg.app.agent_name.clone(),
            resources: ResourceManager::new(store.clone()),
            store,
            gate,
            dispatcher,
            catalog: DocumentCatalog::new(cfg.catalog.documents.clone()),
            exporter,
            events,
            shutdown,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn state(&self) -> SessionState {
        self.store.read()
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn gate(&self) -> &Arc<ConfirmationGate> {
        &self.gate
    }

    pub fn catalog(&self) -> &DocumentCatalog {
        &self.catalog
    }

    /// 供外部 Agent 使用的通道（与界面共享同一份状态）
    pub fn agent_channel(&self) -> AgentChannel {
        AgentChannel::new(self.agent_name.clone(), self.store.clone(), self.gate.clone())
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CanvasEvent> {
        self.events.subscribe()
    }

    pub fn set_research_question(&self, question: impl Into<String>) {
        let mut state = self.store.read();
        state.research_question = Some(question.into());
        self.store.write(state);
    }

    pub fn set_report(&self, report: impl Into<String>) {
        let mut state = self.store.read();
        state.report = Some(report.into());
        self.store.write(state);
    }

    pub fn progress(&self) -> Option<ProgressView> {
        project(&self.store.read())
    }

    /// 从目录中选择文档；未知 id 忽略并返回 false
    pub fn select_document(&self, id: &str) -> bool {
        match self.catalog.find(id) {
            Some(selection) => {
                self.dispatcher.select(selection);
                true
            }
            None => false,
        }
    }

    pub fn select(&self, selection: DocumentSelection) {
        self.dispatcher.select(selection);
    }

    pub fn selected_document(&self) -> DocumentSelection {
        self.dispatcher.selection()
    }

    pub async fn export_pdf(&self) -> Option<PathBuf> {
        let report = self.store.read().report;
        self.exporter.export_pdf(report.as_deref()).await
    }

    pub async fn export_codelabs(&self) -> Option<String> {
        self.exporter.export_codelabs().await
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
