//! 会话副作用分发：观察文档选择的变化，每次变为非空 id 就发出一次 /sourcedocument 通知
//!
//! 不与上一次的值比较，重复选择同一文档也会再次通知；初始的空选择不触发。
//! 通知在后台按选择顺序逐个发送，失败只记日志、不重试、不影响本地状态。

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::backend::BackendClient;
use crate::core::DocumentSelection;

pub struct SideEffectDispatcher {
    tx: mpsc::UnboundedSender<DocumentSelection>,
    current: watch::Sender<DocumentSelection>,
}

impl SideEffectDispatcher {
    /// 启动后台通知任务；cancel 触发后任务退出（已在发送中的请求不会被取消）
    pub fn spawn(backend: Arc<dyn BackendClient>, cancel: CancellationToken) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<DocumentSelection>();
        let (current, _) = watch::channel(DocumentSelection::default());

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    Some(selection) = rx.recv() => {
                        notify_source_document(backend.as_ref(), &selection).await;
                    }
                    else => break,
                }
            }
            tracing::debug!("side-effect dispatcher stopped");
        });

        Self { tx, current }
    }

    /// 记录新的选择；id 非空时排队一次通知
    pub fn select(&self, selection: DocumentSelection) {
        self.current.send_replace(selection.clone());
        if selection.is_empty() {
            return;
        }
        if self.tx.send(selection).is_err() {
            tracing::warn!("side-effect dispatcher is not running, selection not sent");
        }
    }

    pub fn selection(&self) -> DocumentSelection {
        self.current.borrow().clone()
    }
}

async fn notify_source_document(backend: &dyn BackendClient, selection: &DocumentSelection) {
    match backend.send_source_document(selection).await {
        Ok(()) => tracing::info!(
            document_id = %selection.id,
            document_name = %selection.name,
            "source document sent"
        ),
        Err(e) => tracing::warn!(
            document_id = %selection.id,
            error = %e,
            "failed to send source document"
        ),
    }
}
