//! 导出：PDF 保存为可下载文件，Codelabs 成功后打开查看器
//!
//! 失败（网络错误、非 2xx、写文件失败）只记日志，返回 None，不弹错误。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::backend::BackendClient;
use crate::core::CanvasError;
use crate::events::CanvasEvent;

pub struct Exporter {
    backend: Arc<dyn BackendClient>,
    download_dir: PathBuf,
    pdf_file_name: String,
    viewer_url: String,
    events: broadcast::Sender<CanvasEvent>,
}

impl Exporter {
    pub fn new(
        backend: Arc<dyn BackendClient>,
        download_dir: PathBuf,
        pdf_file_name: String,
        viewer_url: String,
        events: broadcast::Sender<CanvasEvent>,
    ) -> Self {
        Self {
            backend,
            download_dir,
            pdf_file_name,
            viewer_url,
            events,
        }
    }

    /// 导出报告为 PDF；成功返回保存路径
    pub async fn export_pdf(&self, report: Option<&str>) -> Option<PathBuf> {
        match self.save_pdf(report.unwrap_or_default()).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), "PDF exported");
                let _ = self.events.send(CanvasEvent::DownloadReady { path: path.clone() });
                Some(path)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to export PDF");
                None
            }
        }
    }

    async fn save_pdf(&self, report: &str) -> Result<PathBuf, CanvasError> {
        let bytes = self.backend.export_pdf(report).await?;
        tokio::fs::create_dir_all(&self.download_dir).await?;
        let path = self.download_dir.join(&self.pdf_file_name);
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }

    /// 导出 Codelabs；成功返回需要打开的查看器地址
    pub async fn export_codelabs(&self) -> Option<String> {
        match self.backend.export_codelabs().await {
            Ok(()) => {
                tracing::info!(viewer = %self.viewer_url, "Codelab export successful");
                let _ = self.events.send(CanvasEvent::OpenViewer {
                    url: self.viewer_url.clone(),
                });
                Some(self.viewer_url.clone())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to export Codelab");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, RecordingBackend};

    fn exporter(backend: Arc<RecordingBackend>, dir: PathBuf) -> (Exporter, broadcast::Receiver<CanvasEvent>) {
        let (events, rx) = broadcast::channel(8);
        let exporter = Exporter::new(
            backend,
            dir,
            "output.pdf".into(),
            "http://localhost:9000".into(),
            events,
        );
        (exporter, rx)
    }

    #[tokio::test]
    async fn test_pdf_is_saved_as_output_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, _calls) = RecordingBackend::new();
        let backend = Arc::new(backend);
        let (exporter, mut events) = exporter(backend.clone(), dir.path().join("downloads"));

        let path = exporter.export_pdf(Some("# Report")).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "output.pdf");
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 mock");
        assert_eq!(
            backend.calls(),
            vec![BackendCall::ExportPdf {
                report: "# Report".into()
            }]
        );
        assert!(matches!(events.try_recv().unwrap(), CanvasEvent::DownloadReady { .. }));
    }

    #[tokio::test]
    async fn test_failed_exports_produce_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, _calls) = RecordingBackend::new();
        backend.set_failing(true);
        let (exporter, mut events) = exporter(Arc::new(backend), dir.path().to_path_buf());

        assert!(exporter.export_pdf(None).await.is_none());
        assert!(exporter.export_codelabs().await.is_none());
        assert!(!dir.path().join("output.pdf").exists());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_codelabs_opens_viewer() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, _calls) = RecordingBackend::new();
        let (exporter, mut events) = exporter(Arc::new(backend), dir.path().to_path_buf());

        assert_eq!(exporter.export_codelabs().await.as_deref(), Some("http://localhost:9000"));
        assert!(matches!(
            events.try_recv().unwrap(),
            CanvasEvent::OpenViewer { ref url } if url == "http://localhost:9000"
        ));
    }
}
