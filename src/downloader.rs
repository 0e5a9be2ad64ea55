//! Image downloader
//!
//! One ranked post becomes one file: a HEAD probe picks the extension, then the image is
//! streamed chunk by chunk into `<rank>-<postId>.<ext>`. A stream that breaks or stalls is
//! restarted from the beginning under the fetcher's retry policy, truncating what the failed
//! attempt wrote.

use crate::error::{MalformedContentError, Result};
use crate::http::Fetcher;
use crate::retry::with_retry;
use crate::types::{DownloadTarget, RankedPost};
use crate::utils::{extension_from_content_type, extract_post_id};
use reqwest::header::CONTENT_TYPE;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Writes ranked posts' images into the run's output directory
#[derive(Clone, Debug)]
pub struct ImageDownloader {
    fetcher: Arc<Fetcher>,
    output_dir: PathBuf,
}

impl ImageDownloader {
    /// Create a downloader writing into `output_dir`
    pub fn new(fetcher: Arc<Fetcher>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            output_dir: output_dir.into(),
        }
    }

    /// Directory files are written into
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Probe the image and work out where it will be written
    pub async fn resolve_target(
        &self,
        ranked: &RankedPost,
        image_url: &str,
    ) -> Result<DownloadTarget> {
        let post_id = extract_post_id(&ranked.post.link)?;

        let headers = self.fetcher.head(image_url).await?;
        let extension = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(extension_from_content_type)
            .ok_or_else(|| MalformedContentError::MissingContentType {
                url: image_url.to_string(),
            })?;

        Ok(DownloadTarget {
            rank: ranked.rank,
            post_id,
            image_url: image_url.to_string(),
            extension,
        })
    }

    /// Download the post's image and return the written path
    ///
    /// An existing file is never overwritten. If every attempt fails the partial file is
    /// removed and the last cause is returned.
    pub async fn download(&self, ranked: &RankedPost, image_url: &str) -> Result<PathBuf> {
        let target = self.resolve_target(ranked, image_url).await?;
        let path = self.output_dir.join(target.file_name());

        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let url = target.image_url.as_str();
        let file = path.as_path();
        let outcome = with_retry(self.fetcher.retry_config(), move || {
            self.write_attempt(url, file)
        })
        .await;

        match outcome {
            Ok(bytes) => {
                tracing::debug!(
                    rank = target.rank,
                    post_id = %target.post_id,
                    bytes,
                    path = %path.display(),
                    "Image written"
                );
                Ok(path)
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    tracing::debug!(
                        error = %remove_err,
                        path = %path.display(),
                        "Could not remove partial file"
                    );
                }
                Err(e.into_fetch(url))
            }
        }
    }

    /// One full stream of `url` into `path`, replacing anything an earlier attempt wrote
    async fn write_attempt(&self, url: &str, path: &Path) -> Result<u64> {
        let mut response = self.fetcher.open_stream(url).await?;
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .await?;

        let mut written = 0u64;
        while let Some(chunk) = self.fetcher.next_chunk(&mut response, url).await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}
