use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::docs::api::DocumentApi;
use crate::docs::types::{Answer, DocId, Document, FieldEdit, FileBlob};
use crate::error::{extract_message, ApiError, Operation};

/// REST client for the document service.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// No request timeout: a stuck call leaves its lifecycle pending.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, req: RequestBuilder, op: Operation) -> Result<Response, ApiError> {
        let resp = req.send().await.map_err(|e| {
            debug!(?op, error = %e, "request did not reach the server");
            ApiError::transport(e)
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message =
            extract_message(&body).unwrap_or_else(|| op.default_message().to_string());
        debug!(?op, status = status.as_u16(), %message, "request failed");
        Err(ApiError::remote(message))
    }

    async fn decode<T: DeserializeOwned>(resp: Response, op: Operation) -> Result<T, ApiError> {
        let bytes = resp.bytes().await.map_err(ApiError::transport)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            debug!(?op, error = %e, "undecodable response body");
            ApiError::remote_default(op)
        })
    }
}

#[async_trait]
impl DocumentApi for HttpApi {
    async fn list(&self, selected: Option<bool>) -> Result<Vec<Document>, ApiError> {
        let mut req = self.client.get(self.endpoint("/pdfs"));
        if let Some(flag) = selected {
            req = req.query(&[("selected", flag)]);
        }
        let resp = self.send(req, Operation::List).await?;
        Self::decode(resp, Operation::List).await
    }

    async fn upload(&self, blob: &FileBlob) -> Result<Document, ApiError> {
        let part = Part::bytes(blob.bytes.clone())
            .file_name(blob.file_name.clone())
            .mime_str(blob.content_type())
            .map_err(ApiError::transport)?;
        let form = Form::new().part("file", part);

        let req = self
            .client
            .post(self.endpoint("/pdfs/upload"))
            .multipart(form);
        let resp = self.send(req, Operation::Upload).await?;
        Self::decode(resp, Operation::Upload).await
    }

    async fn update_field(&self, id: DocId, edit: &FieldEdit) -> Result<(), ApiError> {
        let req = self
            .client
            .put(self.endpoint(&format!("/pdfs/{}", id)))
            .json(&edit.to_payload());
        self.send(req, Operation::Update).await?;
        Ok(())
    }

    async fn delete(&self, id: DocId) -> Result<(), ApiError> {
        let req = self.client.delete(self.endpoint(&format!("/pdfs/{}", id)));
        self.send(req, Operation::Delete).await?;
        Ok(())
    }

    async fn ask(&self, id: DocId, question: &str) -> Result<Answer, ApiError> {
        let req = self
            .client
            .post(self.endpoint(&format!("/pdfs/{}/ask", id)))
            .json(&serde_json::json!({ "question": question }));
        let resp = self.send(req, Operation::Ask).await?;
        Self::decode(resp, Operation::Ask).await
    }
}
