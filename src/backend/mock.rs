//! Recording 后端（用于测试，无需真实服务）
//!
//! 记录每一次调用，并通过通道通知等待方；可切换为全部失败以覆盖错误路径。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::backend::BackendClient;
use crate::core::{CanvasError, DocumentSelection};

/// 已发生的后端调用
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    ExportPdf { report: String },
    ExportCodelabs,
    SourceDocument { document_id: String, document_name: String },
}

pub struct RecordingBackend {
    calls: Mutex<Vec<BackendCall>>,
    notify: mpsc::UnboundedSender<BackendCall>,
    failing: AtomicBool,
    pdf: Bytes,
}

impl RecordingBackend {
    /// 返回后端与调用通知接收端
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BackendCall>) {
        let (notify, rx) = mpsc::unbounded_channel();
        let backend = Self {
            calls: Mutex::new(Vec::new()),
            notify,
            failing: AtomicBool::new(false),
            pdf: Bytes::from_static(b"%PDF-1.4 mock"),
        };
        (backend, rx)
    }

    /// 之后的调用都返回 HTTP 500
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, endpoint: &str, call: BackendCall) -> Result<(), CanvasError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.clone());
        }
        let _ = self.notify.send(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CanvasError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: 500,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BackendClient for RecordingBackend {
    async fn export_pdf(&self, report: &str) -> Result<Bytes, CanvasError> {
        self.record(
            "/exportPDF",
            BackendCall::ExportPdf {
                report: report.to_string(),
            },
        )?;
        Ok(self.pdf.clone())
    }

    async fn export_codelabs(&self) -> Result<(), CanvasError> {
        self.record("/exportCodelabs", BackendCall::ExportCodelabs)
    }

    async fn send_source_document(&self, selection: &DocumentSelection) -> Result<(), CanvasError> {
        self.record(
            "/sourcedocument",
            BackendCall::SourceDocument {
                document_id: selection.id.clone(),
                document_name: selection.name.clone(),
            },
        )
    }
}
