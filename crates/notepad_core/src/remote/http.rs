//! HTTP-backed remote document store client.
//!
//! # Responsibility
//! - Upsert and list note documents against a JSON document API:
//!   `PUT {base}/notes/{uuid}` and `GET {base}/notes`.
//! - Tag writes with the authenticated user when one is available; an
//!   anonymous session still syncs.
//!
//! # Invariants
//! - Transport and non-success responses map to `RemoteError::Transport`.
//! - Requests carry a bounded timeout so callers never hang on the network.

use crate::auth::AuthProvider;
use crate::remote::{NoteDocument, RemoteError, RemoteResult, RemoteStore};
use log::info;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_HEADER: &str = "x-notepad-user";

/// Remote store speaking JSON over HTTP.
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    auth: Arc<dyn AuthProvider>,
}

impl HttpRemoteStore {
    /// Builds a client for the given document API base URL.
    ///
    /// # Errors
    /// - `Transport` when the underlying HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, auth: Arc<dyn AuthProvider>) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| RemoteError::Transport(format!("http client setup failed: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn notes_url(&self) -> String {
        format!("{}/notes", self.base_url)
    }
}

impl RemoteStore for HttpRemoteStore {
    fn push(&self, document: &NoteDocument) -> RemoteResult<()> {
        let url = format!("{}/{}", self.notes_url(), document.uuid);
        let mut request = self.client.put(&url).json(document);
        // Auth failures never block the write; the note is tagged only when
        // a user id is available.
        if let Some(user_id) = self.auth.current_user_id() {
            request = request.header(USER_HEADER, user_id);
        }

        let response = request
            .send()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Transport(format!(
                "push of `{}` rejected with status {status}",
                document.uuid
            )));
        }

        info!(
            "event=remote_push module=remote status=ok uuid={}",
            document.uuid
        );
        Ok(())
    }

    fn pull_all(&self) -> RemoteResult<Vec<NoteDocument>> {
        let mut request = self.client.get(self.notes_url());
        if let Some(user_id) = self.auth.current_user_id() {
            request = request.header(USER_HEADER, user_id);
        }

        let response = request
            .send()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            // A collection that does not exist yet is a legitimately empty
            // remote, not a transport failure.
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(RemoteError::Transport(format!(
                "pull rejected with status {status}"
            )));
        }

        let documents: Vec<NoteDocument> = response
            .json()
            .map_err(|err| RemoteError::InvalidDocument(err.to_string()))?;

        info!(
            "event=remote_pull module=remote status=ok count={}",
            documents.len()
        );
        Ok(documents)
    }

    fn delete(&self, uuid: &str) -> RemoteResult<()> {
        let url = format!("{}/{}", self.notes_url(), uuid);
        let mut request = self.client.delete(&url);
        if let Some(user_id) = self.auth.current_user_id() {
            request = request.header(USER_HEADER, user_id);
        }

        let response = request
            .send()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        let status = response.status();
        // An already-missing document keeps delete idempotent.
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(RemoteError::Transport(format!(
                "delete of `{uuid}` rejected with status {status}"
            )));
        }

        info!("event=remote_delete module=remote status=ok uuid={uuid}");
        Ok(())
    }
}
