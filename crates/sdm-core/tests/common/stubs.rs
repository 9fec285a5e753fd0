//! Stub services shared by the pipeline, scheduler, and session tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::sync::{Barrier, Notify};

use sdm_core::catalog::{
    AlbumContext, AlbumRecord, AlbumRef, AlbumTrack, CatalogError, CatalogService, ReleaseDate,
    TrackRecord,
};
use sdm_core::media::{
    AudioFetcher, AudioLocator, AudioStream, ImageSource, ImageStream, LocatedAudio, MediaError,
    TranscodeSpec, Transcoder,
};
use sdm_core::pipeline::Services;
use sdm_core::tag::{TagEmbedder, TagError, TagSet};

pub const AUDIO_BYTES: &[u8] = b"raw-audio-payload";
pub const IMAGE_BYTES: &[u8] = b"\xFF\xD8\xFFjpeg-payload";

/// Shared observation point: which queries ran, in what order, and how many
/// pipelines were between locate and embed at once.
#[derive(Default)]
pub struct Recorder {
    pub queries: Mutex<Vec<String>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl Recorder {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    fn enter(&self, query: &str) {
        self.queries.lock().unwrap().push(query.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct StubLocator {
    pub recorder: Arc<Recorder>,
    /// Queries that yield no candidate.
    pub missing: HashSet<String>,
    /// When set, every locate call waits at the barrier; pipelines of one
    /// batch must be in flight together for the test to make progress.
    pub barrier: Option<Arc<Barrier>>,
}

#[async_trait]
impl AudioLocator for StubLocator {
    async fn search_one(&self, query: &str) -> Result<Option<LocatedAudio>, MediaError> {
        self.recorder.enter(query);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.missing.contains(query) {
            self.recorder.exit();
            return Ok(None);
        }
        Ok(Some(LocatedAudio {
            url: format!("stub://{query}"),
        }))
    }
}

pub struct StubFetcher;

#[async_trait]
impl AudioFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> Result<AudioStream, MediaError> {
        Ok(AudioStream::from_reader(Cursor::new(AUDIO_BYTES.to_vec())))
    }
}

pub struct StubTranscoder;

#[async_trait]
impl Transcoder for StubTranscoder {
    async fn transcode(
        &self,
        input: AudioStream,
        _spec: &TranscodeSpec,
        dest: &Path,
    ) -> Result<(), MediaError> {
        let (mut reader, _producer) = input.into_parts();
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        tokio::fs::write(dest, &bytes).await?;
        Ok(())
    }
}

pub struct StubImages {
    pub opens: AtomicUsize,
}

impl StubImages {
    pub fn new() -> Self {
        Self {
            opens: AtomicUsize::new(0),
        }
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

struct ChunkedImage {
    chunks: VecDeque<Vec<u8>>,
}

#[async_trait]
impl ImageStream for ChunkedImage {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, MediaError> {
        Ok(self.chunks.pop_front())
    }
}

#[async_trait]
impl ImageSource for StubImages {
    async fn open(&self, _url: &str) -> Result<Box<dyn ImageStream>, MediaError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        // Two chunks so per-chunk progress is observable.
        let (a, b) = IMAGE_BYTES.split_at(IMAGE_BYTES.len() / 2);
        Ok(Box::new(ChunkedImage {
            chunks: VecDeque::from(vec![a.to_vec(), b.to_vec()]),
        }))
    }
}

pub struct StubEmbedder {
    pub recorder: Arc<Recorder>,
    pub last_tags: Mutex<Option<TagSet>>,
}

impl StubEmbedder {
    pub fn new(recorder: Arc<Recorder>) -> Self {
        Self {
            recorder,
            last_tags: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TagEmbedder for StubEmbedder {
    async fn embed(&self, staging: &Path, dest: &Path, tags: &TagSet) -> Result<(), TagError> {
        tokio::fs::copy(staging, dest).await?;
        *self.last_tags.lock().unwrap() = Some(tags.clone());
        self.recorder.exit();
        Ok(())
    }
}

/// Full stub service set sharing one recorder.
pub struct StubServiceSet {
    pub services: Arc<Services>,
    pub recorder: Arc<Recorder>,
    pub images: Arc<StubImages>,
    pub embedder: Arc<StubEmbedder>,
}

pub fn stub_services(missing: HashSet<String>, barrier: Option<Arc<Barrier>>) -> StubServiceSet {
    let recorder = Arc::new(Recorder::default());
    let images = Arc::new(StubImages::new());
    let embedder = Arc::new(StubEmbedder::new(Arc::clone(&recorder)));
    let services = Arc::new(Services {
        locator: Arc::new(StubLocator {
            recorder: Arc::clone(&recorder),
            missing,
            barrier,
        }),
        fetcher: Arc::new(StubFetcher),
        transcoder: Arc::new(StubTranscoder),
        images: images.clone(),
        embedder: embedder.clone(),
    });
    StubServiceSet {
        services,
        recorder,
        images,
        embedder,
    }
}

pub fn track_record(title: &str, artist: &str, album: &str) -> TrackRecord {
    TrackRecord {
        id: format!("id-{title}"),
        title: title.to_string(),
        artists: vec![artist.to_string()],
        track_number: 1,
        disc_number: 1,
        duration_ms: 1000,
        track_url: "S".to_string(),
        artist_url: "A".to_string(),
        album: AlbumContext {
            name: album.to_string(),
            artist: artist.to_string(),
            release_date: ReleaseDate::parse("2020-01-02"),
            cover_url: "U".to_string(),
        },
    }
}

pub fn album_record(id: &str, name: &str, artist: &str, titles: &[&str]) -> AlbumRecord {
    AlbumRecord {
        id: id.to_string(),
        name: name.to_string(),
        artist: artist.to_string(),
        release_date: ReleaseDate::parse("2020-01-02"),
        cover_url: "U".to_string(),
        tracks: titles
            .iter()
            .enumerate()
            .map(|(i, title)| AlbumTrack {
                id: format!("{id}-{i}"),
                title: title.to_string(),
                artists: vec![artist.to_string()],
                track_number: i as u32 + 1,
                disc_number: 1,
                duration_ms: 1000,
                track_url: "S".to_string(),
                artist_url: "A".to_string(),
            })
            .collect(),
    }
}

/// Catalog stub with a fixed set of records and controllable authorization.
pub struct StubCatalog {
    pub auth_gate: Option<Arc<Notify>>,
    pub fail_auth: bool,
    pub tracks: HashMap<String, TrackRecord>,
    pub playlists: HashMap<String, Vec<TrackRecord>>,
    pub albums: HashMap<String, AlbumRecord>,
    pub artist_albums: HashMap<String, Vec<AlbumRef>>,
    pub calls: AtomicUsize,
}

impl StubCatalog {
    pub fn new() -> Self {
        Self {
            auth_gate: None,
            fail_auth: false,
            tracks: HashMap::new(),
            playlists: HashMap::new(),
            albums: HashMap::new(),
            artist_albums: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogService for StubCatalog {
    async fn authorize(&self) -> Result<(), CatalogError> {
        if let Some(gate) = &self.auth_gate {
            gate.notified().await;
        }
        if self.fail_auth {
            return Err(CatalogError::Auth("bad credentials".into()));
        }
        Ok(())
    }

    async fn track(&self, id: &str) -> Result<TrackRecord, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tracks
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::Decode(format!("unknown track {id}")))
    }

    async fn playlist_tracks(&self, id: &str) -> Result<Vec<TrackRecord>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.playlists
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::Decode(format!("unknown playlist {id}")))
    }

    async fn album(&self, id: &str) -> Result<AlbumRecord, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.albums
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::Decode(format!("unknown album {id}")))
    }

    async fn artist_albums(&self, id: &str) -> Result<Vec<AlbumRef>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.artist_albums
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::Decode(format!("unknown artist {id}")))
    }
}
