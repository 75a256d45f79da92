//! 后端客户端抽象
//!
//! 画布对外只有三个 HTTP 调用：导出 PDF、导出 Codelabs、通知源文档选择。
//! 所有实现（reqwest / Recording）都实现 BackendClient；失败由调用方记录日志，不重试。

mod http;
mod mock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::core::{CanvasError, DocumentSelection};

pub use self::http::HttpBackend;
pub use self::mock::{BackendCall, RecordingBackend};

/// 后端客户端 trait
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// POST /exportPDF `{report}`，返回 PDF 字节
    async fn export_pdf(&self, report: &str) -> Result<Bytes, CanvasError>;

    /// POST /exportCodelabs（空 body）
    async fn export_codelabs(&self) -> Result<(), CanvasError>;

    /// POST /sourcedocument `{documentId, documentName}`
    async fn send_source_document(&self, selection: &DocumentSelection) -> Result<(), CanvasError>;
}
