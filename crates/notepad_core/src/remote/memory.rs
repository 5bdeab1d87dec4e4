//! In-memory remote store used by tests and offline development.
//!
//! Behaves like the HTTP store minus the network: upsert-by-uuid semantics,
//! plus a transport-failure toggle so callers can exercise the
//! error-suppresses-merge path.

use crate::remote::{NoteDocument, RemoteError, RemoteResult, RemoteStore};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Map-backed remote store keyed by note uuid.
#[derive(Default)]
pub struct InMemoryRemoteStore {
    documents: Mutex<BTreeMap<String, NoteDocument>>,
    fail_transport: AtomicBool,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every push/pull fails with `RemoteError::Transport`.
    pub fn set_fail_transport(&self, fail: bool) {
        self.fail_transport.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of all stored documents, sorted by uuid.
    pub fn documents(&self) -> Vec<NoteDocument> {
        match self.documents.lock() {
            Ok(documents) => documents.values().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_transport(&self) -> RemoteResult<()> {
        if self.fail_transport.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport(
                "simulated transport failure".to_string(),
            ));
        }
        Ok(())
    }
}

impl RemoteStore for InMemoryRemoteStore {
    fn push(&self, document: &NoteDocument) -> RemoteResult<()> {
        self.check_transport()?;
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| RemoteError::Transport("remote store lock poisoned".to_string()))?;
        documents.insert(document.uuid.clone(), document.clone());
        Ok(())
    }

    fn pull_all(&self) -> RemoteResult<Vec<NoteDocument>> {
        self.check_transport()?;
        let documents = self
            .documents
            .lock()
            .map_err(|_| RemoteError::Transport("remote store lock poisoned".to_string()))?;
        Ok(documents.values().cloned().collect())
    }

    fn delete(&self, uuid: &str) -> RemoteResult<()> {
        self.check_transport()?;
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| RemoteError::Transport("remote store lock poisoned".to_string()))?;
        documents.remove(uuid);
        Ok(())
    }
}
