//! Shared cover-art cache: idempotent fetch keyed by album identity.

use std::path::PathBuf;

use crate::catalog::AlbumContext;
use crate::media::ImageSource;
use crate::progress::ProgressHandle;

use super::{PipelineError, Workspace};

/// Returns the cached art path for the album, fetching it first if absent.
/// A present file is reused without touching the network and without any
/// progress notification; a fetch reports each received chunk and a final
/// message once the image is persisted.
pub(super) async fn ensure_cover_art(
    images: &dyn ImageSource,
    workspace: &Workspace,
    album: &AlbumContext,
    progress: &ProgressHandle,
) -> Result<PathBuf, PipelineError> {
    let path = workspace.art_path(&album.artist, &album.name);
    match tokio::fs::try_exists(&path).await {
        Ok(true) => return Ok(path),
        Ok(false) => {}
        Err(source) => return Err(PipelineError::Io { path, source }),
    }

    let mut stream = images
        .open(&album.cover_url)
        .await
        .map_err(PipelineError::Art)?;
    let mut image = Vec::new();
    while let Some(chunk) = stream.next_chunk().await.map_err(PipelineError::Art)? {
        progress.data(chunk.len());
        image.extend_from_slice(&chunk);
    }
    tokio::fs::write(&path, &image)
        .await
        .map_err(|source| PipelineError::Io {
            path: path.clone(),
            source,
        })?;
    progress.message("--> downloaded thumbnail");
    Ok(path)
}
