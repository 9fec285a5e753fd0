//! Logging init: file under the XDG state dir, with stderr fallback.
//!
//! Progress lines for the user go to stdout via the CLI; tracing output is
//! kept in a log file so it never interleaves with them.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,sdm_core=debug,sdm=debug";

/// Per-event writer handed out by the file sink; degrades to stderr when the
/// file handle cannot be cloned.
enum LogWriter {
    File(fs::File),
    Stderr,
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogWriter::File(f) => f.write(buf),
            LogWriter::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogWriter::File(f) => f.flush(),
            LogWriter::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct FileSink(fs::File);

impl<'a> MakeWriter<'a> for FileSink {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogWriter::File)
            .unwrap_or(LogWriter::Stderr)
    }
}

fn open_log_file() -> Result<(fs::File, PathBuf)> {
    let state_dir = xdg::BaseDirectories::with_prefix("sdm")?
        .get_state_home()
        .join("sdm");
    fs::create_dir_all(&state_dir)?;
    let path = state_dir.join("sdm.log");
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize structured logging to `~/.local/state/sdm/sdm.log`; if the log
/// dir is unwritable, log to stderr instead. Never fails.
pub fn init() {
    match open_log_file() {
        Ok((file, path)) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(BoxMakeWriter::new(FileSink(file)))
                .with_ansi(false)
                .init();
            tracing::info!("sdm logging initialized at {}", path.display());
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(io::stderr)
                .with_ansi(false)
                .init();
            tracing::warn!("file logging unavailable ({e}); logging to stderr");
        }
    }
}
