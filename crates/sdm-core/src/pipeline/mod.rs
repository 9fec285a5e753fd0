//! Per-track download pipeline: sanitize → locate → fetch → transcode →
//! cover art → tag → finalize → cleanup.
//!
//! Each run is one state machine over a single track record. Failures in
//! locate, fetch, or transcode terminate that run only; cleanup failures
//! are logged and never fatal.

mod art;
mod cleanup;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::catalog::TrackRecord;
use crate::config::SdmConfig;
use crate::media::{AudioFetcher, AudioLocator, ImageSource, MediaError, TranscodeSpec, Transcoder};
use crate::progress::{ProgressFuture, ProgressHandle};
use crate::sanitize::sanitize_display_name;
use crate::tag::{Artwork, TagEmbedder, TagError, TagSet};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no audio candidate found for \"{query}\"")]
    NotFound { query: String },

    #[error("locate failed: {0}")]
    Locate(#[source] MediaError),

    #[error("fetch failed: {0}")]
    Fetch(#[source] MediaError),

    #[error("transcode failed: {0}")]
    Transcode(#[source] MediaError),

    #[error("cover art failed: {0}")]
    Art(#[source] MediaError),

    #[error("tag embedding failed: {0}")]
    Tag(#[from] TagError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The external collaborators one pipeline run needs.
pub struct Services {
    pub locator: Arc<dyn AudioLocator>,
    pub fetcher: Arc<dyn AudioFetcher>,
    pub transcoder: Arc<dyn Transcoder>,
    pub images: Arc<dyn ImageSource>,
    pub embedder: Arc<dyn TagEmbedder>,
}

/// Filesystem layout and target format for pipeline outputs. Final files
/// land in `out_dir`; staging audio and the cover-art cache live in the
/// hidden working directory underneath it.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub out_dir: PathBuf,
    pub work_dir: PathBuf,
    pub format: String,
    pub bitrate_kbps: u32,
}

impl Workspace {
    pub fn new(out_dir: PathBuf, cfg: &SdmConfig) -> Self {
        let work_dir = out_dir.join(&cfg.work_dir_name);
        Self {
            out_dir,
            work_dir,
            format: cfg.format.clone(),
            bitrate_kbps: cfg.bitrate_kbps,
        }
    }

    /// Creates the hidden working directory if missing. Idempotent; called
    /// before any stage touches the filesystem.
    pub async fn ensure(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.work_dir).await
    }

    fn staging_path(&self, name: &str) -> PathBuf {
        self.work_dir.join(format!("{name}_raw.{}", self.format))
    }

    fn final_path(&self, name: &str) -> PathBuf {
        self.out_dir.join(format!("{name}.{}", self.format))
    }

    fn art_path(&self, album_artist: &str, album: &str) -> PathBuf {
        self.work_dir.join(format!("{album_artist} - {album}.jpg"))
    }
}

/// Terminal success value of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub message: String,
}

/// Builds the progress-reporting pipeline run for one track. Nothing
/// executes until the returned future is joined.
pub fn download_track(
    services: Arc<Services>,
    workspace: Workspace,
    track: TrackRecord,
) -> ProgressFuture<DownloadSummary, PipelineError> {
    ProgressFuture::new(move |progress| run_stages(services, workspace, track, progress))
}

async fn run_stages(
    services: Arc<Services>,
    workspace: Workspace,
    mut track: TrackRecord,
    progress: ProgressHandle,
) -> Result<DownloadSummary, PipelineError> {
    // Stage 1: sanitize the display fields used for paths and queries.
    track.title = sanitize_display_name(&track.title);
    if let Some(primary) = track.artists.first_mut() {
        *primary = sanitize_display_name(primary);
    }
    track.album.name = sanitize_display_name(&track.album.name);
    let query = track.display_name();

    // Stage 2: locate remote audio; the service's best match is final.
    let located = services
        .locator
        .search_one(&query)
        .await
        .map_err(PipelineError::Locate)?
        .ok_or_else(|| PipelineError::NotFound {
            query: query.clone(),
        })?;

    // Stage 3: fetch raw bytes and transcode into the staging file.
    progress.message(format!("Starting download {query}"));
    workspace.ensure().await.map_err(|source| PipelineError::Io {
        path: workspace.work_dir.clone(),
        source,
    })?;
    let stream = services
        .fetcher
        .fetch(&located.url)
        .await
        .map_err(PipelineError::Fetch)?;
    progress.message("--> downloaded audio");
    let staging = workspace.staging_path(&query);
    let spec = TranscodeSpec {
        format: workspace.format.clone(),
        bitrate_kbps: workspace.bitrate_kbps,
    };
    services
        .transcoder
        .transcode(stream, &spec, &staging)
        .await
        .map_err(PipelineError::Transcode)?;
    progress.message("--> converted audio");

    // Stage 4: cover art, shared across pipelines of the same album.
    let art_path = art::ensure_cover_art(&*services.images, &workspace, &track.album, &progress).await?;

    // Stage 5: embed the tag set and write the final file.
    let artwork_data = tokio::fs::read(&art_path)
        .await
        .map_err(|source| PipelineError::Io {
            path: art_path.clone(),
            source,
        })?;
    let tags = TagSet::from_track(
        &track,
        Artwork {
            data: artwork_data,
            mime_type: "image/jpeg".into(),
            description: "thumbnail".into(),
        },
    );
    let final_path = workspace.final_path(&query);
    services.embedder.embed(&staging, &final_path, &tags).await?;
    progress.message("--> applied metadata");

    // Stage 6: drop the staging file; never fatal.
    cleanup::remove_with_busy_retry(&staging).await;

    Ok(DownloadSummary {
        message: format!("--> Downloaded {query}"),
    })
}
