//! Pull-merge-push sync engine.
//!
//! # Responsibility
//! - Reconcile the local repository with a remote document store.
//!
//! # Invariants
//! - Pull completes before merge starts; merge completes before push starts.
//! - A pull transport failure aborts the cycle before merge, so an errored
//!   pull is never conflated with a legitimately empty remote store.
//! - On uuid collision the local copy wins; remote data is counted but
//!   never applied over existing local content.

use crate::remote::{NoteDocument, RemoteError, RemoteStore};
use crate::repo::note_repo::{NoteListQuery, NoteRepository, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Outcome counters for one sync cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Documents retrieved from the remote store.
    pub pulled: usize,
    /// Remote documents materialized into local storage.
    pub merged: usize,
    /// Remote documents dropped because they failed to decode.
    pub skipped: usize,
    /// Local notes upserted to the remote store.
    pub pushed: usize,
    /// Per-note push failures. Non-fatal; retried on the next cycle.
    pub push_failures: usize,
}

/// Fatal-to-this-cycle sync errors.
///
/// Both variants leave local and remote stores untouched beyond the steps
/// that already completed; callers report and retry on the next trigger.
#[derive(Debug)]
pub enum SyncError {
    /// The remote store could not be reached during pull.
    RemoteUnavailable(RemoteError),
    /// Local persistence failed mid-cycle.
    Repo(RepoError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemoteUnavailable(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RemoteUnavailable(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Reconciles one repository with one remote store.
///
/// Both handles are injected at construction; the engine holds no global
/// state and one instance may run any number of cycles.
pub struct SyncEngine<R: NoteRepository> {
    repo: R,
    remote: Arc<dyn RemoteStore>,
}

impl<R: NoteRepository> SyncEngine<R> {
    pub fn new(repo: R, remote: Arc<dyn RemoteStore>) -> Self {
        Self { repo, remote }
    }

    /// Runs one pull -> merge -> push cycle.
    ///
    /// # Errors
    /// - `RemoteUnavailable` when pull fails; merge and push are skipped
    ///   entirely for this cycle.
    /// - `Repo` when local persistence fails; remaining steps are aborted.
    ///
    /// Individual push failures after a successful merge are not errors;
    /// they are counted in the report and retried on the next cycle.
    pub fn sync_once(&self) -> Result<SyncReport, SyncError> {
        info!("event=sync_cycle module=sync status=start");
        let mut report = SyncReport::default();

        let documents = match self.remote.pull_all() {
            Ok(documents) => documents,
            Err(err) => {
                error!(
                    "event=sync_cycle module=sync status=error stage=pull error={}",
                    err
                );
                return Err(SyncError::RemoteUnavailable(err));
            }
        };
        report.pulled = documents.len();

        self.merge(&documents, &mut report)?;
        self.push_all(&mut report)?;

        info!(
            "event=sync_cycle module=sync status=ok pulled={} merged={} skipped={} pushed={} push_failures={}",
            report.pulled, report.merged, report.skipped, report.pushed, report.push_failures
        );
        Ok(report)
    }

    /// Additive union: materialize remote documents with no local
    /// counterpart. Existing local notes are never overwritten, so locally
    /// divergent content silently wins.
    fn merge(&self, documents: &[NoteDocument], report: &mut SyncReport) -> Result<(), SyncError> {
        for document in documents {
            let note = match document.try_into_note() {
                Ok(note) => note,
                Err(err) => {
                    warn!(
                        "event=sync_merge module=sync status=skipped uuid={} error={}",
                        document.uuid, err
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            if self.repo.insert_if_absent(&note)? {
                report.merged += 1;
            }
        }
        Ok(())
    }

    /// Pushes the full post-merge local set as idempotent upserts.
    fn push_all(&self, report: &mut SyncReport) -> Result<(), SyncError> {
        let notes = self.repo.list_notes(&NoteListQuery::default())?;
        for note in &notes {
            match self.remote.push(&NoteDocument::from(note)) {
                Ok(()) => report.pushed += 1,
                Err(err) => {
                    warn!(
                        "event=sync_push module=sync status=error uuid={} error={}",
                        note.uuid, err
                    );
                    report.push_failures += 1;
                }
            }
        }
        Ok(())
    }
}
