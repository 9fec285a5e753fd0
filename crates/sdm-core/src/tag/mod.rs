//! Tag embedding: field-set construction and the embedder seam.

pub mod id3v2;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{ReleaseDate, TrackRecord};

#[derive(Debug, Error)]
pub enum TagError {
    #[error("tag write failed: {0}")]
    Write(#[from] id3::Error),

    #[error("tag I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Embedded cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub description: String,
}

/// The full field set embedded into a finished file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    /// All contributing artists, in catalog order.
    pub artists: Vec<String>,
    pub title: String,
    pub album: String,
    pub album_artist: String,
    pub track_number: u32,
    pub disc_number: u32,
    /// Primary-artist web link.
    pub artist_url: String,
    /// Audio web link; written to both audio link fields.
    pub audio_url: String,
    pub duration_ms: u64,
    pub release: ReleaseDate,
    pub artwork: Artwork,
}

impl TagSet {
    pub fn from_track(track: &TrackRecord, artwork: Artwork) -> Self {
        Self {
            artists: track.artists.clone(),
            title: track.title.clone(),
            album: track.album.name.clone(),
            album_artist: track.album.artist.clone(),
            track_number: track.track_number,
            disc_number: track.disc_number,
            artist_url: track.artist_url.clone(),
            audio_url: track.track_url.clone(),
            duration_ms: track.duration_ms,
            release: track.album.release_date.clone(),
            artwork,
        }
    }
}

#[async_trait]
pub trait TagEmbedder: Send + Sync {
    /// Embeds `tags` into the audio at `staging` and writes the finished
    /// file to `dest`, replacing any existing file there.
    async fn embed(&self, staging: &Path, dest: &Path, tags: &TagSet) -> Result<(), TagError>;
}
