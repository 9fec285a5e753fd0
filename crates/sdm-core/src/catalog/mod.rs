//! Catalog metadata: track/album/artist records and the catalog service seam.
//!
//! The service is consumed as a black box returning structured records; the
//! production implementation against the Spotify Web API lives in
//! [`spotify`].

mod record;
pub mod spotify;

pub use record::{AlbumContext, AlbumRecord, AlbumRef, AlbumTrack, ReleaseDate, TrackRecord};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Token acquisition failed. Fatal: the session enters its permanent
    /// error state and drops further work.
    #[error("token acquisition failed: {0}")]
    Auth(String),

    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned HTTP {0}")]
    Status(u16),

    #[error("unexpected catalog payload: {0}")]
    Decode(String),
}

/// Catalog metadata service. All calls except `authorize` require a prior
/// successful `authorize`; the session performs it once at startup.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// One-time client-credentials exchange; gates session readiness.
    async fn authorize(&self) -> Result<(), CatalogError>;

    async fn track(&self, id: &str) -> Result<TrackRecord, CatalogError>;

    /// Tracks of a playlist, preserving playlist order.
    async fn playlist_tracks(&self, id: &str) -> Result<Vec<TrackRecord>, CatalogError>;

    async fn album(&self, id: &str) -> Result<AlbumRecord, CatalogError>;

    /// The artist's albums, in catalog order.
    async fn artist_albums(&self, id: &str) -> Result<Vec<AlbumRef>, CatalogError>;
}
