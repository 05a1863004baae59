//! Writing a chosen candidate to its resolved local path.

use std::fs;

use crate::cache::LocalImage;
use crate::error::PersistError;
use crate::extract::ImageCandidate;
use crate::http::HttpClient;

/// Write a candidate image to `target`.
///
/// Inline bytes are written directly; remote candidates are streamed to
/// disk through the client. The parent directory is created if absent.
/// Failures come back as values, never as panics across this boundary;
/// the caller logs the cause.
pub async fn persist_candidate<C: HttpClient>(
    client: &C,
    candidate: &ImageCandidate,
    target: &LocalImage,
) -> Result<(), PersistError> {
    if let Some(parent) = target.fs_path.parent() {
        fs::create_dir_all(parent)?;
    }

    match candidate {
        ImageCandidate::Inline(bytes) => {
            fs::write(&target.fs_path, bytes)?;
            tracing::debug!(
                path = %target.fs_path.display(),
                bytes = bytes.len(),
                "wrote inline image"
            );
            Ok(())
        }
        ImageCandidate::Remote(url) => {
            let written = client.download(url, &target.fs_path).await?;
            tracing::debug!(
                url,
                path = %target.fs_path.display(),
                bytes = written,
                "downloaded image"
            );
            Ok(())
        }
    }
}
