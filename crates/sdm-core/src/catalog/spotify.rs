//! Spotify Web API client: client-credentials auth and catalog lookups.

use serde::Deserialize;
use tokio::sync::RwLock;

use super::{
    AlbumContext, AlbumRecord, AlbumRef, AlbumTrack, CatalogError, CatalogService, ReleaseDate,
    TrackRecord,
};
use async_trait::async_trait;

const API_BASE: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Spotify application credentials for the client-credentials grant.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

pub struct SpotifyCatalog {
    http: reqwest::Client,
    credentials: Credentials,
    api_base: String,
    token_url: String,
    token: RwLock<Option<String>>,
}

impl SpotifyCatalog {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoints(credentials, API_BASE, TOKEN_URL)
    }

    /// Overridable endpoints, for tests against a local server.
    pub fn with_endpoints(
        credentials: Credentials,
        api_base: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            api_base: api_base.into(),
            token_url: token_url.into(),
            token: RwLock::new(None),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let token = self
            .token
            .read()
            .await
            .clone()
            .ok_or_else(|| CatalogError::Auth("no access token; authorize first".into()))?;
        let url = format!("{}{}", self.api_base, path);
        let response = self.http.get(&url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl CatalogService for SpotifyCatalog {
    async fn authorize(&self) -> Result<(), CatalogError> {
        if self.credentials.client_id.is_empty() || self.credentials.client_secret.is_empty() {
            return Err(CatalogError::Auth(
                "missing Spotify client credentials".into(),
            ));
        }
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CatalogError::Auth(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Auth(format!("HTTP {}", status.as_u16())));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Auth(e.to_string()))?;
        *self.token.write().await = Some(token.access_token);
        Ok(())
    }

    async fn track(&self, id: &str) -> Result<TrackRecord, CatalogError> {
        let dto: TrackDto = self.get_json(&format!("/tracks/{id}")).await?;
        dto.into_record()
    }

    async fn playlist_tracks(&self, id: &str) -> Result<Vec<TrackRecord>, CatalogError> {
        let dto: PlaylistDto = self.get_json(&format!("/playlists/{id}")).await?;
        // Items whose track is absent (removed or region-blocked) are skipped.
        dto.tracks
            .items
            .into_iter()
            .filter_map(|item| item.track)
            .map(TrackDto::into_record)
            .collect()
    }

    async fn album(&self, id: &str) -> Result<AlbumRecord, CatalogError> {
        let dto: AlbumDto = self.get_json(&format!("/albums/{id}")).await?;
        dto.into_record()
    }

    async fn artist_albums(&self, id: &str) -> Result<Vec<AlbumRef>, CatalogError> {
        let dto: Paging<AlbumRefDto> = self.get_json(&format!("/artists/{id}/albums")).await?;
        Ok(dto
            .items
            .into_iter()
            .map(|a| AlbumRef { id: a.id, name: a.name })
            .collect())
    }
}

// Wire shapes, mapped into records at the edge.

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Paging<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize, Default)]
struct ExternalUrls {
    #[serde(default)]
    spotify: String,
}

#[derive(Debug, Deserialize)]
struct ArtistDto {
    name: String,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct ImageDto {
    url: String,
}

#[derive(Debug, Deserialize)]
struct AlbumSummaryDto {
    name: String,
    #[serde(default)]
    artists: Vec<ArtistDto>,
    #[serde(default)]
    images: Vec<ImageDto>,
    #[serde(default)]
    release_date: String,
}

#[derive(Debug, Deserialize)]
struct TrackDto {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistDto>,
    album: AlbumSummaryDto,
    #[serde(default)]
    track_number: u32,
    #[serde(default)]
    disc_number: u32,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct PlaylistDto {
    tracks: Paging<PlaylistItemDto>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemDto {
    track: Option<TrackDto>,
}

#[derive(Debug, Deserialize)]
struct AlbumDto {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistDto>,
    #[serde(default)]
    images: Vec<ImageDto>,
    #[serde(default)]
    release_date: String,
    tracks: Paging<AlbumTrackDto>,
}

#[derive(Debug, Deserialize)]
struct AlbumTrackDto {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistDto>,
    #[serde(default)]
    track_number: u32,
    #[serde(default)]
    disc_number: u32,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct AlbumRefDto {
    id: String,
    name: String,
}

fn artist_names(artists: &[ArtistDto]) -> Vec<String> {
    artists.iter().map(|a| a.name.clone()).collect()
}

fn primary_artist_url(artists: &[ArtistDto]) -> String {
    artists
        .first()
        .map(|a| a.external_urls.spotify.clone())
        .unwrap_or_default()
}

fn first_image_url(images: &[ImageDto]) -> String {
    images.first().map(|i| i.url.clone()).unwrap_or_default()
}

impl TrackDto {
    fn into_record(self) -> Result<TrackRecord, CatalogError> {
        if self.artists.is_empty() {
            return Err(CatalogError::Decode(format!(
                "track \"{}\" has no artists",
                self.name
            )));
        }
        Ok(TrackRecord {
            artists: artist_names(&self.artists),
            artist_url: primary_artist_url(&self.artists),
            album: AlbumContext {
                artist: self
                    .album
                    .artists
                    .first()
                    .map(|a| a.name.clone())
                    .unwrap_or_default(),
                cover_url: first_image_url(&self.album.images),
                release_date: ReleaseDate::parse(&self.album.release_date),
                name: self.album.name,
            },
            id: self.id,
            title: self.name,
            track_number: self.track_number,
            disc_number: self.disc_number,
            duration_ms: self.duration_ms,
            track_url: self.external_urls.spotify,
        })
    }
}

impl AlbumDto {
    fn into_record(self) -> Result<AlbumRecord, CatalogError> {
        Ok(AlbumRecord {
            artist: self
                .artists
                .first()
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            cover_url: first_image_url(&self.images),
            release_date: ReleaseDate::parse(&self.release_date),
            tracks: self
                .tracks
                .items
                .into_iter()
                .map(|t| AlbumTrack {
                    artists: artist_names(&t.artists),
                    artist_url: primary_artist_url(&t.artists),
                    id: t.id,
                    title: t.name,
                    track_number: t.track_number,
                    disc_number: t.disc_number,
                    duration_ms: t.duration_ms,
                    track_url: t.external_urls.spotify,
                })
                .collect(),
            id: self.id,
            name: self.name,
        })
    }
}
