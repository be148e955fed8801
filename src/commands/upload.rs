use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::docs::types::FileBlob;
use crate::docs::Desk;

const BUSY: &str = "An upload is already in progress.";

/// Read a file from disk and upload it
pub async fn upload(desk: &mut Desk, path: &str) -> Result<String> {
    if desk.uploading().is_pending() {
        return Ok(BUSY.to_string());
    }
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path))?;

    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string();

    info!(path, size = bytes.len(), "file read for upload");
    match desk.create(FileBlob::new(file_name.clone(), bytes)) {
        Some(_) => Ok(format!("Uploading {}...", file_name)),
        None => Ok(BUSY.to_string()),
    }
}

pub fn retry(desk: &mut Desk) -> String {
    let Some(name) = desk.staged_upload().map(|b| b.file_name.clone()) else {
        return "Nothing to retry.".to_string();
    };
    match desk.retry_upload() {
        Some(_) => format!("Retrying upload of {}...", name),
        None => BUSY.to_string(),
    }
}
