//! Staging-file removal with busy retry.

use std::path::Path;
use std::time::Duration;

const BUSY_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Deletes `path`, retrying once per second while the filesystem reports it
/// busy. Any other error is logged and swallowed.
pub(super) async fn remove_with_busy_retry(path: &Path) {
    loop {
        match tokio::fs::remove_file(path).await {
            Ok(()) => return,
            Err(e) if is_busy(&e) => {
                tracing::debug!(path = %path.display(), "staging file busy, retrying removal");
                tokio::time::sleep(BUSY_RETRY_DELAY).await;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not remove staging file");
                return;
            }
        }
    }
}

#[cfg(unix)]
fn is_busy(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(libc::EBUSY)
}

// Windows reports files locked by another handle as permission denied.
#[cfg(not(unix))]
fn is_busy(e: &std::io::Error) -> bool {
    e.kind() == std::io::ErrorKind::PermissionDenied
}
