//! Locate and fetch audio via the external `yt-dlp` tool.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{AudioFetcher, AudioLocator, AudioStream, LocatedAudio, MediaError};

const TOOL: &str = "yt-dlp";

/// `yt-dlp` adapter: best-match search via `ytsearch1:` and raw audio
/// streamed from the tool's stdout.
pub struct YtDlp {
    program: String,
}

impl YtDlp {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new(TOOL)
    }
}

#[async_trait]
impl AudioLocator for YtDlp {
    async fn search_one(&self, query: &str) -> Result<Option<LocatedAudio>, MediaError> {
        let output = Command::new(&self.program)
            .args(["--no-playlist", "--no-download", "--print", "webpage_url"])
            .arg(format!("ytsearch1:{query}"))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|source| MediaError::Spawn { tool: TOOL, source })?;
        if !output.status.success() {
            tracing::debug!(query, status = %output.status, "search returned no candidate");
            return Ok(None);
        }
        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if url.is_empty() {
            return Ok(None);
        }
        Ok(Some(LocatedAudio { url }))
    }
}

#[async_trait]
impl AudioFetcher for YtDlp {
    async fn fetch(&self, url: &str) -> Result<AudioStream, MediaError> {
        let child = Command::new(&self.program)
            .args(["--no-playlist", "--quiet", "-f", "bestaudio", "-o", "-", "--"])
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| MediaError::Spawn { tool: TOOL, source })?;
        AudioStream::from_child(TOOL, child)
    }
}
