//! Long-lived download session: readiness gate, entry dispatch, expansion.
//!
//! One `Session` per process lifecycle: construct → acquire credentials →
//! ready-or-error → serve requests. The readiness flag is a watch channel,
//! so dispatch awaits the credential exchange instead of polling.

mod expand;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};

use crate::catalog::CatalogService;
use crate::pipeline::{Services, Workspace};
use crate::router::CatalogRef;
use crate::scheduler::QueueReport;

/// Process-wide readiness of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Credential exchange still in flight; dispatch defers.
    Loading,
    /// Token obtained; dispatch proceeds.
    Ready,
    /// Token acquisition failed; dispatch drops requests until restart.
    Error,
}

pub struct Session {
    catalog: Arc<dyn CatalogService>,
    services: Arc<Services>,
    workspace: Workspace,
    batch_size: usize,
    progress_tx: Option<mpsc::Sender<String>>,
    readiness: watch::Receiver<Readiness>,
}

impl Session {
    /// Builds a session and starts the one-time credential exchange that
    /// flips readiness to `Ready` or `Error`.
    pub fn start(
        catalog: Arc<dyn CatalogService>,
        services: Arc<Services>,
        workspace: Workspace,
        batch_size: usize,
        progress_tx: Option<mpsc::Sender<String>>,
    ) -> Self {
        let (tx, rx) = watch::channel(Readiness::Loading);
        let auth_catalog = Arc::clone(&catalog);
        tokio::spawn(async move {
            match auth_catalog.authorize().await {
                Ok(()) => {
                    let _ = tx.send(Readiness::Ready);
                }
                Err(e) => {
                    tracing::error!("token acquisition failed: {e}");
                    tracing::error!(
                        "check the Spotify app credentials in the config file (see `sdm config`)"
                    );
                    let _ = tx.send(Readiness::Error);
                }
            }
        });
        Self {
            catalog,
            services,
            workspace,
            batch_size,
            progress_tx,
            readiness: rx,
        }
    }

    /// Current readiness state without waiting.
    pub fn readiness(&self) -> Readiness {
        *self.readiness.borrow()
    }

    /// Waits out `Loading`. Returns `true` once ready, `false` when the
    /// session is in the permanent error state.
    async fn await_ready(&self) -> bool {
        let mut rx = self.readiness.clone();
        loop {
            match *rx.borrow_and_update() {
                Readiness::Ready => return true,
                Readiness::Error => return false,
                Readiness::Loading => {}
            }
            if rx.changed().await.is_err() {
                return false;
            }
        }
    }

    /// Entry dispatch: parses the reference and runs the matching download.
    /// Unrecognized references are ignored without error; dispatch while the
    /// credential exchange is pending waits for it; a failed exchange drops
    /// the request. Per-item download failures are reported in the returned
    /// counts, never as an `Err`.
    pub async fn download(&self, url: &str, redownload: bool) -> Result<QueueReport> {
        if !self.await_ready().await {
            tracing::warn!("session is not authorized; dropping {url}");
            return Ok(QueueReport::default());
        }
        let Some(reference) = CatalogRef::parse(url) else {
            tracing::warn!("ignoring unrecognized catalog reference: {url}");
            return Ok(QueueReport::default());
        };
        self.workspace
            .ensure()
            .await
            .with_context(|| format!("create working directory {}", self.workspace.work_dir.display()))?;

        match reference {
            CatalogRef::Track(id) => self.download_single(&id).await,
            CatalogRef::Playlist(id) => self.download_playlist(&id, redownload).await,
            CatalogRef::Album(id) => self.download_album(&id, redownload).await,
            CatalogRef::Artist(id) => self.download_artist(&id, redownload).await,
        }
    }
}
