use async_trait::async_trait;

use super::types::{Answer, DocId, Document, FieldEdit, FileBlob};
use crate::error::ApiError;

/// The remote document service, as seen by the desk.
///
/// Implementations own transport and encoding. The desk only relies on the
/// error split between [`ApiError::Transport`] and [`ApiError::Remote`].
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Fetch the ordered collection, optionally constrained by `selected`.
    async fn list(&self, selected: Option<bool>) -> Result<Vec<Document>, ApiError>;

    /// Upload a file; the response carries the new document's id.
    async fn upload(&self, blob: &FileBlob) -> Result<Document, ApiError>;

    /// Persist one field. Callers treat this as fire-and-forget.
    async fn update_field(&self, id: DocId, edit: &FieldEdit) -> Result<(), ApiError>;

    async fn delete(&self, id: DocId) -> Result<(), ApiError>;

    async fn ask(&self, id: DocId, question: &str) -> Result<Answer, ApiError>;
}
