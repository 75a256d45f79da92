//! reqwest 后端：JSON body、统一超时，非 2xx 转为 HttpStatus 错误

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};
use serde_json::json;

use crate::backend::BackendClient;
use crate::core::{CanvasError, DocumentSelection};

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn check(endpoint: &str, resp: Response) -> Result<Response, CanvasError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(CanvasError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: resp.status().as_u16(),
            })
        }
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn export_pdf(&self, report: &str) -> Result<Bytes, CanvasError> {
        let endpoint = "/exportPDF";
        let resp = self
            .client
            .post(self.url(endpoint))
            .json(&json!({ "report": report }))
            .send()
            .await?;
        let bytes = Self::check(endpoint, resp)?.bytes().await?;
        Ok(bytes)
    }

    async fn export_codelabs(&self) -> Result<(), CanvasError> {
        let endpoint = "/exportCodelabs";
        let resp = self.client.post(self.url(endpoint)).send().await?;
        Self::check(endpoint, resp)?;
        Ok(())
    }

    async fn send_source_document(&self, selection: &DocumentSelection) -> Result<(), CanvasError> {
        let endpoint = "/sourcedocument";
        let resp = self
            .client
            .post(self.url(endpoint))
            .json(&json!({
                "documentId": selection.id,
                "documentName": selection.name,
            }))
            .send()
            .await?;
        Self::check(endpoint, resp)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:8000/", 5);
        assert_eq!(backend.url("/exportPDF"), "http://localhost:8000/exportPDF");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // 端口 9 (discard) 在测试环境中通常无人监听
        let backend = HttpBackend::new("http://127.0.0.1:9", 2);
        let err = backend.export_codelabs().await.unwrap_err();
        assert!(matches!(err, CanvasError::Network(_)));
    }
}
