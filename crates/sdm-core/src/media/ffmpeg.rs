//! Transcoding via the external `ffmpeg` tool, fed from a byte stream.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{AudioStream, MediaError, TranscodeSpec, Transcoder};

const TOOL: &str = "ffmpeg";

pub struct Ffmpeg {
    program: String,
}

impl Ffmpeg {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new(TOOL)
    }
}

#[async_trait]
impl Transcoder for Ffmpeg {
    async fn transcode(
        &self,
        input: AudioStream,
        spec: &TranscodeSpec,
        dest: &Path,
    ) -> Result<(), MediaError> {
        let mut child = Command::new(&self.program)
            .args(["-hide_banner", "-loglevel", "error", "-i", "pipe:0", "-vn", "-f"])
            .arg(&spec.format)
            .arg("-b:a")
            .arg(format!("{}k", spec.bitrate_kbps))
            .arg("-y")
            .arg(dest)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| MediaError::Spawn { tool: TOOL, source })?;
        let mut stdin = child.stdin.take().ok_or(MediaError::Pipe(TOOL))?;

        let (mut reader, producer) = input.into_parts();
        // A copy failure here is usually ffmpeg closing the pipe early; the
        // exit statuses below carry the real cause.
        let copy_result = tokio::io::copy(&mut reader, &mut stdin).await;
        drop(stdin);

        let status = child.wait().await.map_err(MediaError::Io)?;
        if let Some((tool, mut producer)) = producer {
            let producer_status = producer.wait().await.map_err(MediaError::Io)?;
            if !producer_status.success() {
                return Err(MediaError::Tool {
                    tool,
                    status: producer_status,
                });
            }
        }
        if !status.success() {
            return Err(MediaError::Tool { tool: TOOL, status });
        }
        copy_result?;
        Ok(())
    }
}
