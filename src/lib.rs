//! # booru-rank-dl
//!
//! Crawl an image board's tag search, rank every post found by its popularity score and
//! download the top 100 images into a fresh `output` directory.
//!
//! ## Flow
//!
//! 1. Raw tags are sanitized ([`tags`]): whitespace runs become `_`.
//! 2. All listing pages are fetched concurrently and parsed into scored candidates
//!    ([`parser::SearchResultParser`]).
//! 3. Candidates are merged, sorted by score and cut to the top 100
//!    ([`pipeline::rank_candidates`]).
//! 4. Each kept post's detail page is fetched, its image URL extracted
//!    ([`parser::PostDetailParser`]) and the image streamed to `<rank>-<postId>.<ext>`
//!    ([`downloader::ImageDownloader`]).
//!
//! Every network call is retried with exponential backoff ([`retry`]). Failures are logged
//! per page or per post and never abort the run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use booru_rank_dl::{Config, RankingPipeline, sanitize_tags, utils::create_output_dir};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let output_dir = create_output_dir(&std::env::current_dir()?, &config.output_base)?;
//!
//!     let pipeline = RankingPipeline::new(&config, output_dir)?;
//!     let summary = pipeline.run(2, &sanitize_tags(["cat", "long hair"])).await;
//!
//!     println!("downloaded {} of {}", summary.downloaded, summary.ranked);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Image download and persistence
pub mod downloader;
/// Error types
pub mod error;
/// Retrying HTTP client
pub mod http;
/// Listing and post-detail markup parsers
pub mod parser;
/// Two-phase crawl, rank and download pipeline
pub mod pipeline;
/// Retry logic with exponential backoff
pub mod retry;
/// Search tag sanitization
pub mod tags;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{Config, RetryConfig};
pub use error::{Error, MalformedContentError, Result};
pub use pipeline::{PAGE_STRIDE, RankingPipeline, TOP_POSTS_LIMIT, rank_candidates};
pub use tags::sanitize_tags;
pub use types::{CandidatePost, DownloadTarget, RankedPost, RunSummary, SearchTag, Stage};
