//! In-memory [`DocumentApi`] for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::api::DocumentApi;
use super::types::{Answer, DocId, Document, FieldEdit, FileBlob};
use crate::error::{ApiError, Operation};

/// A hand-rolled mock backed by a vector of "remote" documents.
///
/// Supports:
/// - Persistent per-operation failures via [`fail`](MockApi::fail).
/// - Per-call latency queues via [`delay_next`](MockApi::delay_next), field
///   writes included (falling back to the fixed write delay).
/// - Recording of every field write (including failed ones).
pub struct MockApi {
    remote: Mutex<Vec<Document>>,
    next_id: Mutex<DocId>,
    failures: Mutex<HashMap<&'static str, ApiError>>,
    delays: Mutex<HashMap<&'static str, VecDeque<Duration>>>,
    write_delay: Option<Duration>,
    fail_writes: bool,
    answer: Mutex<Option<Answer>>,
    writes: Mutex<Vec<(DocId, FieldEdit)>>,
    calls: Mutex<Vec<String>>,
}

fn op_key(op: Operation) -> &'static str {
    match op {
        Operation::List => "list",
        Operation::Upload => "upload",
        Operation::Update => "update",
        Operation::Delete => "delete",
        Operation::Ask => "ask",
    }
}

impl MockApi {
    pub fn new(remote: Vec<Document>) -> Self {
        let next_id = remote.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        Self {
            remote: Mutex::new(remote),
            next_id: Mutex::new(next_id),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            write_delay: None,
            fail_writes: false,
            answer: Mutex::new(None),
            writes: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Make every subsequent call of `op` fail with `err`.
    pub fn fail(&self, op: Operation, err: ApiError) {
        self.failures.lock().unwrap().insert(op_key(op), err);
    }

    pub fn recover(&self, op: Operation) {
        self.failures.lock().unwrap().remove(op_key(op));
    }

    /// Queue a latency for the next call of `op` (FIFO across calls).
    pub fn delay_next(&self, op: Operation, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .entry(op_key(op))
            .or_default()
            .push_back(delay);
    }

    /// Fixed answer for every ask; otherwise the answer echoes the question.
    pub fn set_answer(&self, answer: Answer) {
        *self.answer.lock().unwrap() = Some(answer);
    }

    pub fn set_remote(&self, docs: Vec<Document>) {
        *self.remote.lock().unwrap() = docs;
    }

    pub fn remote(&self) -> Vec<Document> {
        self.remote.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<(DocId, FieldEdit)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, op: Operation, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        let delay = self
            .delays
            .lock()
            .unwrap()
            .get_mut(op_key(op))
            .and_then(|q| q.pop_front());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.failures.lock().unwrap().get(op_key(op)).cloned();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub fn doc(id: DocId, name: &str, selected: bool) -> Document {
    Document {
        id,
        name: name.to_string(),
        selected,
        file: Some(format!("/media/{}.pdf", id)),
    }
}

#[async_trait]
impl DocumentApi for MockApi {
    async fn list(&self, selected: Option<bool>) -> Result<Vec<Document>, ApiError> {
        self.enter(Operation::List, format!("list {:?}", selected))
            .await?;
        let remote = self.remote.lock().unwrap();
        Ok(remote
            .iter()
            .filter(|d| selected.map_or(true, |s| d.selected == s))
            .cloned()
            .collect())
    }

    async fn upload(&self, blob: &FileBlob) -> Result<Document, ApiError> {
        self.enter(Operation::Upload, format!("upload {}", blob.file_name))
            .await?;
        let id = {
            let mut next = self.next_id.lock().unwrap();
            let id = *next;
            *next += 1;
            id
        };
        let created = Document {
            id,
            name: blob.file_name.clone(),
            selected: false,
            file: Some(format!("/media/{}", blob.file_name)),
        };
        self.remote.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_field(&self, id: DocId, edit: &FieldEdit) -> Result<(), ApiError> {
        self.writes.lock().unwrap().push((id, edit.clone()));
        let queued = self
            .delays
            .lock()
            .unwrap()
            .get_mut(op_key(Operation::Update))
            .and_then(|q| q.pop_front());
        if let Some(delay) = queued.or(self.write_delay) {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes {
            return Err(ApiError::remote_default(Operation::Update));
        }
        if let Some(d) = self.remote.lock().unwrap().iter_mut().find(|d| d.id == id) {
            d.apply(edit);
        }
        Ok(())
    }

    async fn delete(&self, id: DocId) -> Result<(), ApiError> {
        self.enter(Operation::Delete, format!("delete {}", id))
            .await?;
        let mut remote = self.remote.lock().unwrap();
        let before = remote.len();
        remote.retain(|d| d.id != id);
        if remote.len() == before {
            return Err(ApiError::remote("PDF not found"));
        }
        Ok(())
    }

    async fn ask(&self, id: DocId, question: &str) -> Result<Answer, ApiError> {
        self.enter(Operation::Ask, format!("ask {} {}", id, question))
            .await?;
        let fixed = self.answer.lock().unwrap().clone();
        Ok(fixed.unwrap_or_else(|| Answer {
            answer: format!("re: {}", question),
            sources: Vec::new(),
        }))
    }
}
