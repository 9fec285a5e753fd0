//! Catalog expansion: reference type → ordered backlog → drain.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::catalog::CatalogError;
use crate::pipeline;
use crate::progress::{Progress, ProgressKind};
use crate::scheduler::{self, Backlog, BacklogItem, QueueReport};

use super::Session;

impl Session {
    /// Runs a single track straight through the pipeline, no backlog.
    pub(super) async fn download_single(&self, id: &str) -> Result<QueueReport> {
        let track = self
            .catalog
            .track(id)
            .await
            .with_context(|| format!("fetch track {id}"))?;
        let label = track.display_name();
        let download = pipeline::download_track(
            Arc::clone(&self.services),
            self.workspace.clone(),
            track,
        );
        if let Some(tx) = self.progress_tx.clone() {
            let mut messages = download.subscribe(ProgressKind::Message);
            tokio::spawn(async move {
                while let Some(Progress::Message(line)) = messages.recv().await {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
            });
        }
        match download.join().await {
            Ok(summary) => {
                self.report_line(summary.message).await;
                Ok(QueueReport::single(true))
            }
            Err(e) => {
                tracing::warn!(track = %label, "download failed: {e}");
                self.report_line(format!("Error downloading {label}: {e}")).await;
                Ok(QueueReport::single(false))
            }
        }
    }

    /// Playlist: enqueue every track in playlist order, then drain.
    pub(super) async fn download_playlist(&self, id: &str, redownload: bool) -> Result<QueueReport> {
        let tracks = self
            .catalog
            .playlist_tracks(id)
            .await
            .with_context(|| format!("fetch playlist {id}"))?;
        let mut backlog = Backlog::new();
        for track in tracks {
            backlog.push(BacklogItem { track, redownload });
        }
        Ok(self.drain(&mut backlog).await)
    }

    /// Album: synthesize the album context onto each track, enqueue, drain.
    pub(super) async fn download_album(&self, id: &str, redownload: bool) -> Result<QueueReport> {
        let mut backlog = Backlog::new();
        self.enqueue_album(&mut backlog, id, redownload)
            .await
            .with_context(|| format!("fetch album {id}"))?;
        Ok(self.drain(&mut backlog).await)
    }

    /// Artist discography, two-phase: enqueue every album's tracks first,
    /// then drain the combined backlog exactly once. An album that fails to
    /// resolve is skipped; the rest still download.
    pub(super) async fn download_artist(&self, id: &str, redownload: bool) -> Result<QueueReport> {
        let albums = self
            .catalog
            .artist_albums(id)
            .await
            .with_context(|| format!("fetch artist albums {id}"))?;
        let mut backlog = Backlog::new();
        for album in &albums {
            if let Err(e) = self.enqueue_album(&mut backlog, &album.id, redownload).await {
                tracing::warn!(album = %album.name, "skipping album: {e}");
            }
        }
        Ok(self.drain(&mut backlog).await)
    }

    async fn enqueue_album(
        &self,
        backlog: &mut Backlog,
        id: &str,
        redownload: bool,
    ) -> Result<(), CatalogError> {
        let album = self.catalog.album(id).await?;
        let context = album.context();
        for track in album.tracks {
            backlog.push(BacklogItem {
                track: track.into_track(context.clone()),
                redownload,
            });
        }
        Ok(())
    }

    async fn drain(&self, backlog: &mut Backlog) -> QueueReport {
        scheduler::drain_backlog(
            Arc::clone(&self.services),
            self.workspace.clone(),
            backlog,
            self.batch_size,
            self.progress_tx.clone(),
        )
        .await
    }

    async fn report_line(&self, line: String) {
        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(line).await;
        }
    }
}
