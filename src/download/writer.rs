//! Streams an HTTP response body to disk.

use std::path::Path;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::client::GgnError;

/// Writes `response`'s body to `path`, returning the number of bytes written.
///
/// The file is created (or truncated). If streaming fails part-way, the
/// partial file is removed so a broken `.torrent` is never left behind.
///
/// # Errors
///
/// Returns [`GgnError::Io`] when the file cannot be created or written and
/// [`GgnError::Network`] when the body stream fails.
pub async fn save_response(
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, GgnError> {
    let mut file = File::create(path)
        .await
        .map_err(|e| GgnError::io(path, e))?;

    let result = stream_to_file(&mut file, response, url, path).await;
    if result.is_err() {
        debug!(path = %path.display(), "cleaning up partial file after error");
        drop(file);
        let _ = tokio::fs::remove_file(path).await;
    }
    result
}

async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<u64, GgnError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| GgnError::network(url, e.without_url()))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| GgnError::io(path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| GgnError::io(path, e))?;
    Ok(bytes_written)
}
