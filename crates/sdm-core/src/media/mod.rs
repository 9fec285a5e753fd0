//! Media service seams: locate, fetch, transcode, and image retrieval.
//!
//! Production implementations shell out to `yt-dlp` and `ffmpeg` or use the
//! shared HTTP client; the pipeline only sees these traits.

pub mod ffmpeg;
pub mod http_image;
pub mod ytdlp;

use std::path::Path;
use std::process::ExitStatus;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::process::Child;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: &'static str,
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}")]
    Tool { tool: &'static str, status: ExitStatus },

    #[error("{0} did not expose a required pipe")]
    Pipe(&'static str),

    #[error("stream I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http status {0}")]
    Status(u16),
}

/// One located remote audio candidate. The locate service's own best-match
/// ranking picks it; no re-ranking happens downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedAudio {
    pub url: String,
}

#[async_trait]
pub trait AudioLocator: Send + Sync {
    /// Best-match search; `None` when the service returns no candidate.
    async fn search_one(&self, query: &str) -> Result<Option<LocatedAudio>, MediaError>;
}

/// A raw audio byte stream, plus the external process producing it (if any)
/// so its exit status can be checked once the stream is drained.
pub struct AudioStream {
    reader: Box<dyn AsyncRead + Send + Unpin>,
    producer: Option<(&'static str, Child)>,
}

impl AudioStream {
    pub fn from_reader(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            producer: None,
        }
    }

    pub fn from_child(tool: &'static str, mut child: Child) -> Result<Self, MediaError> {
        let stdout = child.stdout.take().ok_or(MediaError::Pipe(tool))?;
        Ok(Self {
            reader: Box::new(stdout),
            producer: Some((tool, child)),
        })
    }

    /// Splits the stream for consumption by a transcoder: the byte reader
    /// and the producing process whose exit status must be checked after
    /// the reader is drained.
    pub fn into_parts(
        self,
    ) -> (
        Box<dyn AsyncRead + Send + Unpin>,
        Option<(&'static str, Child)>,
    ) {
        (self.reader, self.producer)
    }
}

/// Target format and bitrate for one transcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeSpec {
    /// Container/format name, also used as the file extension.
    pub format: String,
    pub bitrate_kbps: u32,
}

#[async_trait]
pub trait AudioFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<AudioStream, MediaError>;
}

#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Consumes `input` and writes transcoded audio to `dest`.
    async fn transcode(
        &self,
        input: AudioStream,
        spec: &TranscodeSpec,
        dest: &Path,
    ) -> Result<(), MediaError>;
}

/// Chunked image body; `None` marks end of stream.
#[async_trait]
pub trait ImageStream: Send {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, MediaError>;
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn open(&self, url: &str) -> Result<Box<dyn ImageStream>, MediaError>;
}
