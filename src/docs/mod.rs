pub mod api;
pub mod filter;
#[cfg(test)]
pub mod mock;
pub mod types;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::SyncConfig;
use crate::sync::debounce::DebouncedWriter;
use crate::sync::lifecycle::{Lifecycle, Ticket};

use api::DocumentApi;
use filter::{FilterSelector, ListFilter};
use types::{Answer, DocId, Document, FieldEdit, FileBlob};

/// Which lifecycle an event settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    List,
    Upload,
    /// Deletes are tracked per document.
    Delete(DocId),
    Ask,
}

/// Result of a boundary call, sent back to the desk owner for reconciliation.
#[derive(Debug)]
pub enum DeskEvent {
    Listed {
        ticket: Ticket,
        filter: ListFilter,
        result: Result<Vec<Document>, ApiError>,
    },
    Uploaded {
        ticket: Ticket,
        result: Result<Document, ApiError>,
    },
    Deleted {
        ticket: Ticket,
        id: DocId,
        result: Result<(), ApiError>,
    },
    Answered {
        ticket: Ticket,
        doc_id: DocId,
        result: Result<Answer, ApiError>,
    },
}

impl DeskEvent {
    pub fn kind(&self) -> RequestKind {
        match self {
            DeskEvent::Listed { .. } => RequestKind::List,
            DeskEvent::Uploaded { .. } => RequestKind::Upload,
            DeskEvent::Deleted { id, .. } => RequestKind::Delete(*id),
            DeskEvent::Answered { .. } => RequestKind::Ask,
        }
    }
}

/// A file waiting to be uploaded (or re-uploaded after a failure).
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub blob: FileBlob,
    ticket: Ticket,
}

/// Local, optimistic view of the remote document collection.
///
/// All mutation goes through the operations below. Boundary calls run as
/// spawned tasks and report back through [`next_event`](Desk::next_event);
/// the owner applies each event with [`apply`](Desk::apply), one at a time.
pub struct Desk {
    api: Arc<dyn DocumentApi>,
    docs: Vec<Document>,
    qa_selection: Option<DocId>,
    filter: FilterSelector,
    staged: Option<StagedUpload>,
    listing: Lifecycle<usize>,
    uploading: Lifecycle<DocId>,
    deleting: HashMap<DocId, Lifecycle<()>>,
    asking: Lifecycle<Answer>,
    writer: DebouncedWriter,
    events_tx: mpsc::UnboundedSender<DeskEvent>,
    events_rx: mpsc::UnboundedReceiver<DeskEvent>,
    outstanding: usize,
}

impl Desk {
    pub fn new(api: Arc<dyn DocumentApi>, config: &SyncConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            writer: DebouncedWriter::new(api.clone(), config.debounce),
            api,
            docs: Vec::new(),
            qa_selection: None,
            filter: FilterSelector::default(),
            staged: None,
            listing: Lifecycle::default(),
            uploading: Lifecycle::default(),
            deleting: HashMap::new(),
            asking: Lifecycle::default(),
            events_tx,
            events_rx,
            outstanding: 0,
        }
    }

    // ── Operations ───────────────────────────────────────────────

    /// Fetch the authoritative list. A successful, non-stale response
    /// replaces the whole collection.
    pub fn load(&mut self, filter: ListFilter) -> Ticket {
        let ticket = self.listing.begin();
        info!(%filter, seq = ticket.seq(), "loading documents");
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.list(filter.constraint()).await;
            DeskEvent::Listed {
                ticket,
                filter,
                result,
            }
        });
        ticket
    }

    /// Switch the filter mode and load with it.
    pub fn set_filter(&mut self, mode: ListFilter) -> Ticket {
        self.filter.select(mode);
        self.load(mode)
    }

    pub fn refresh(&mut self) -> Ticket {
        self.load(self.filter.active())
    }

    /// Upload `blob`. It stays staged until an upload of it succeeds.
    ///
    /// Returns `None` without issuing a call while another upload is pending.
    pub fn create(&mut self, blob: FileBlob) -> Option<Ticket> {
        if self.uploading.is_pending() {
            debug!(file = %blob.file_name, "upload already in progress");
            return None;
        }
        let ticket = self.uploading.begin();
        info!(file = %blob.file_name, size = blob.bytes.len(), seq = ticket.seq(), "uploading document");
        self.staged = Some(StagedUpload {
            blob: blob.clone(),
            ticket,
        });
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.upload(&blob).await;
            DeskEvent::Uploaded { ticket, result }
        });
        Some(ticket)
    }

    /// Resubmit the staged file, if any and no upload is pending.
    pub fn retry_upload(&mut self) -> Option<Ticket> {
        let blob = self.staged.as_ref()?.blob.clone();
        self.create(blob)
    }

    /// Optimistically apply `edit` and schedule the debounced remote write.
    ///
    /// Returns `false` when `id` is not in the collection.
    pub fn update_field(&mut self, id: DocId, edit: FieldEdit) -> bool {
        let Some(doc) = self.docs.iter_mut().find(|d| d.id == id) else {
            debug!(doc_id = id, "edit for unknown document ignored");
            return false;
        };
        doc.apply(&edit);
        debug!(doc_id = id, field = %edit.field(), "field edited locally");
        self.writer.enqueue(id, edit);
        true
    }

    /// Delete remotely; the local copy goes only once the server confirms.
    pub fn remove(&mut self, id: DocId) -> Ticket {
        let ticket = self.deleting.entry(id).or_default().begin();
        info!(doc_id = id, seq = ticket.seq(), "deleting document");
        let api = self.api.clone();
        self.spawn(async move {
            let result = api.delete(id).await;
            DeskEvent::Deleted { ticket, id, result }
        });
        ticket
    }

    /// Choose the document questions are asked about.
    pub fn select_for_qa(&mut self, id: DocId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.qa_selection = Some(id);
        true
    }

    /// Ask about the selected document. Clears the previous answer and error.
    ///
    /// Returns `None` without issuing a call when nothing is selected or the
    /// question is blank.
    pub fn ask(&mut self, question: &str) -> Option<Ticket> {
        let doc_id = self.qa_selection?;
        if question.trim().is_empty() {
            return None;
        }
        let ticket = self.asking.begin();
        info!(doc_id, seq = ticket.seq(), "asking document");
        let api = self.api.clone();
        let question = question.to_string();
        self.spawn(async move {
            let result = api.ask(doc_id, &question).await;
            DeskEvent::Answered {
                ticket,
                doc_id,
                result,
            }
        });
        Some(ticket)
    }

    /// Send all pending debounced writes now.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    // ── Settlement ───────────────────────────────────────────────

    /// Wait for the next settled boundary call.
    pub async fn next_event(&mut self) -> Option<DeskEvent> {
        self.events_rx.recv().await
    }

    /// Reconcile local state with a settled call.
    ///
    /// Returns `true` when the event's lifecycle took the outcome, `false`
    /// for a stale settlement superseded by a newer call.
    pub fn apply(&mut self, event: DeskEvent) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);
        match event {
            DeskEvent::Listed {
                ticket,
                filter,
                result,
            } => {
                if !self.listing.is_latest(ticket) {
                    debug!(seq = ticket.seq(), "discarding stale list response");
                    return false;
                }
                let outcome = match result {
                    Ok(docs) => {
                        info!(%filter, count = docs.len(), "documents loaded");
                        self.docs = docs;
                        self.reconcile_selection();
                        let docs = &self.docs;
                        self.deleting
                            .retain(|id, lc| lc.is_pending() || docs.iter().any(|d| d.id == *id));
                        Ok(self.docs.len())
                    }
                    Err(e) => {
                        warn!(%filter, error = %e, "list failed, keeping previous documents");
                        Err(e)
                    }
                };
                self.listing.settle(ticket, outcome)
            }
            DeskEvent::Uploaded { ticket, result } => {
                let outcome = match result {
                    Ok(doc) => {
                        let id = doc.id;
                        info!(doc_id = id, name = %doc.name, "document uploaded");
                        match self.docs.iter_mut().find(|d| d.id == id) {
                            Some(existing) => *existing = doc,
                            None => self.docs.push(doc),
                        }
                        if self.qa_selection.is_none() {
                            self.qa_selection = Some(id);
                        }
                        if self.staged.as_ref().is_some_and(|s| s.ticket == ticket) {
                            self.staged = None;
                        }
                        Ok(id)
                    }
                    Err(e) => {
                        warn!(error = %e, "upload failed, file kept for retry");
                        Err(e)
                    }
                };
                self.uploading.settle(ticket, outcome)
            }
            DeskEvent::Deleted { ticket, id, result } => {
                let outcome = match result {
                    Ok(()) => {
                        info!(doc_id = id, "document deleted");
                        self.docs.retain(|d| d.id != id);
                        self.reconcile_selection();
                        Ok(())
                    }
                    Err(e) => {
                        warn!(doc_id = id, error = %e, "delete failed");
                        Err(e)
                    }
                };
                self.deleting.entry(id).or_default().settle(ticket, outcome)
            }
            DeskEvent::Answered {
                ticket,
                doc_id,
                result,
            } => {
                match &result {
                    Ok(a) => debug!(doc_id, sources = a.sources.len(), "answer received"),
                    Err(e) => warn!(doc_id, error = %e, "ask failed"),
                }
                let applied = self.asking.settle(ticket, result);
                if !applied {
                    debug!(seq = ticket.seq(), "discarding stale answer");
                }
                applied
            }
        }
    }

    /// Apply events until no boundary call is outstanding.
    pub async fn run_until_idle(&mut self) {
        while self.outstanding > 0 {
            match self.events_rx.recv().await {
                Some(event) => {
                    self.apply(event);
                }
                None => break,
            }
        }
    }

    // ── Reads ────────────────────────────────────────────────────

    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.docs.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.get(id).is_some()
    }

    pub fn qa_selection(&self) -> Option<DocId> {
        self.qa_selection
    }

    pub fn active_filter(&self) -> ListFilter {
        self.filter.active()
    }

    pub fn staged_upload(&self) -> Option<&FileBlob> {
        self.staged.as_ref().map(|s| &s.blob)
    }

    pub fn listing(&self) -> &Lifecycle<usize> {
        &self.listing
    }

    pub fn uploading(&self) -> &Lifecycle<DocId> {
        &self.uploading
    }

    /// Delete state of one document, once a delete was issued for it.
    pub fn deleting(&self, id: DocId) -> Option<&Lifecycle<()>> {
        self.deleting.get(&id)
    }

    pub fn asking(&self) -> &Lifecycle<Answer> {
        &self.asking
    }

    pub fn answer(&self) -> Option<&Answer> {
        self.asking.value()
    }

    pub fn ask_error(&self) -> Option<&str> {
        self.asking.error()
    }

    /// Boundary calls issued but not yet applied.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn pending_writes(&self) -> usize {
        self.writer.pending_count()
    }

    pub fn debounce(&self) -> Duration {
        self.writer.delay()
    }

    pub fn set_debounce(&mut self, delay: Duration) {
        self.writer.set_delay(delay);
    }

    // ── Internals ────────────────────────────────────────────────

    fn spawn<F>(&mut self, call: F)
    where
        F: Future<Output = DeskEvent> + Send + 'static,
    {
        self.outstanding += 1;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            // Receiver gone means the desk was dropped; nothing to reconcile.
            let _ = tx.send(call.await);
        });
    }

    /// Keep the Q&A selection pointing at a present document.
    fn reconcile_selection(&mut self) {
        let present = self.qa_selection.is_some_and(|id| self.contains(id));
        if !present {
            self.qa_selection = self.docs.first().map(|d| d.id);
        }
    }
}
