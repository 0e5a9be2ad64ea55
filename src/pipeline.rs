//! Two-phase fetch, rank and download pipeline
//!
//! Phase 1 fetches every listing page concurrently, merges the candidates and keeps the
//! [`TOP_POSTS_LIMIT`] best by score. Phase 2 fetches each kept post's detail page and
//! downloads its image, again concurrently. Both phases settle every task: a failed page or
//! post is logged and skipped, and never aborts its siblings.

use crate::config::Config;
use crate::downloader::ImageDownloader;
use crate::error::Result;
use crate::http::Fetcher;
use crate::parser::{HtmlListingParser, HtmlPostParser, PostDetailParser, SearchResultParser};
use crate::tags::join_tags;
use crate::types::{CandidatePost, RankedPost, RunSummary, SearchTag, Stage};
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;

/// Posts per listing page; the `pid` offset of page `i` is `i * PAGE_STRIDE`
pub const PAGE_STRIDE: usize = 42;

/// Number of top-scored posts kept for download
pub const TOP_POSTS_LIMIT: usize = 100;

/// Listing URL for page `page_index` of a tag search
///
/// Tags are joined with `+` and inserted verbatim.
pub fn listing_url(base_url: &str, page_index: usize, tags: &[SearchTag]) -> String {
    format!(
        "{}/index.php?page=post&s=list&pid={}&tags={}",
        base_url.trim_end_matches('/'),
        page_index * PAGE_STRIDE,
        join_tags(tags)
    )
}

/// Sort candidates descending by score and keep the top [`TOP_POSTS_LIMIT`]
///
/// The sort is stable, so equal scores keep their merge order. A post's rank is its index
/// in the result and does not depend on anything that happens afterwards.
pub fn rank_candidates(mut candidates: Vec<CandidatePost>) -> Vec<RankedPost> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
        .into_iter()
        .take(TOP_POSTS_LIMIT)
        .enumerate()
        .map(|(rank, post)| RankedPost { rank, post })
        .collect()
}

/// Candidates merged from the listing phase
#[derive(Debug, Default)]
pub struct ListingOutcome {
    /// Candidates from every successful page, in page order
    pub candidates: Vec<CandidatePost>,
    /// Pages that could not be fetched
    pub pages_failed: usize,
}

/// Crawl, rank and download orchestration
pub struct RankingPipeline {
    base_url: String,
    fetcher: Arc<Fetcher>,
    listing_parser: Arc<dyn SearchResultParser>,
    post_parser: Arc<dyn PostDetailParser>,
    downloader: ImageDownloader,
}

impl RankingPipeline {
    /// Build a pipeline with the HTML parsers, writing into `output_dir`
    pub fn new(config: &Config, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let fetcher = Arc::new(Fetcher::new(config)?);
        let base_url = config.origin().to_string();
        Ok(Self {
            listing_parser: Arc::new(HtmlListingParser::new(base_url.clone())),
            post_parser: Arc::new(HtmlPostParser),
            downloader: ImageDownloader::new(fetcher.clone(), output_dir),
            base_url,
            fetcher,
        })
    }

    /// Replace the listing parser
    pub fn with_listing_parser(mut self, parser: Arc<dyn SearchResultParser>) -> Self {
        self.listing_parser = parser;
        self
    }

    /// Replace the post-detail parser
    pub fn with_post_parser(mut self, parser: Arc<dyn PostDetailParser>) -> Self {
        self.post_parser = parser;
        self
    }

    /// Run both phases to completion
    ///
    /// Always returns a summary; individual failures only show up as warnings and counts.
    pub async fn run(&self, page_count: usize, tags: &[SearchTag]) -> RunSummary {
        let listing = self.collect_candidates(page_count, tags).await;
        let candidates = listing.candidates.len();
        let ranked = rank_candidates(listing.candidates);

        tracing::info!(
            pages = page_count,
            pages_failed = listing.pages_failed,
            candidates,
            ranked = ranked.len(),
            "Listing phase finished"
        );

        let mut summary = RunSummary {
            pages_requested: page_count,
            pages_failed: listing.pages_failed,
            candidates,
            ranked: ranked.len(),
            output_dir: self.downloader.output_dir().to_path_buf(),
            ..Default::default()
        };

        if ranked.is_empty() {
            return summary;
        }

        let outcomes = self.download_ranked(&ranked).await;
        summary.downloaded = outcomes.iter().filter(|o| o.is_ok()).count();
        summary.posts_failed = outcomes.len() - summary.downloaded;
        summary
    }

    /// Phase 1: fetch and parse every listing page concurrently
    pub async fn collect_candidates(
        &self,
        page_count: usize,
        tags: &[SearchTag],
    ) -> ListingOutcome {
        let pages = join_all((0..page_count).map(|index| self.fetch_page(index, tags))).await;

        let mut outcome = ListingOutcome::default();
        for page in pages {
            match page {
                Ok(candidates) => outcome.candidates.extend(candidates),
                Err(_) => outcome.pages_failed += 1,
            }
        }
        outcome
    }

    /// Phase 2: detail fetch and download for every ranked post concurrently
    ///
    /// Results are returned in rank order regardless of completion order.
    pub async fn download_ranked(&self, ranked: &[RankedPost]) -> Vec<Result<PathBuf>> {
        join_all(ranked.iter().map(|post| self.process_post(post))).await
    }

    async fn fetch_page(&self, index: usize, tags: &[SearchTag]) -> Result<Vec<CandidatePost>> {
        let url = listing_url(&self.base_url, index, tags);
        match self.fetcher.get_text(&url).await {
            Ok(html) => {
                let candidates = self.listing_parser.parse_listing(&html);
                tracing::debug!(
                    page = index,
                    candidates = candidates.len(),
                    "Listing page parsed"
                );
                Ok(candidates)
            }
            Err(e) => {
                tracing::warn!(
                    stage = %Stage::Page,
                    url = %url,
                    error = %e,
                    "Listing page failed"
                );
                Err(e)
            }
        }
    }

    async fn process_post(&self, ranked: &RankedPost) -> Result<PathBuf> {
        let link = &ranked.post.link;

        let image_url = match self.resolve_image_url(link).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    stage = %Stage::Post,
                    rank = ranked.rank,
                    url = %link,
                    error = %e,
                    "Post skipped"
                );
                return Err(e);
            }
        };

        match self.downloader.download(ranked, &image_url).await {
            Ok(path) => Ok(path),
            Err(e) => {
                tracing::warn!(
                    stage = %Stage::Image,
                    rank = ranked.rank,
                    url = %image_url,
                    error = %e,
                    "Image download failed"
                );
                Err(e)
            }
        }
    }

    async fn resolve_image_url(&self, link: &str) -> Result<String> {
        let html = self.fetcher.get_text(link).await?;
        self.post_parser.parse_image_url(&html, link)
    }
}

impl std::fmt::Debug for RankingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingPipeline")
            .field("base_url", &self.base_url)
            .field("output_dir", &self.downloader.output_dir())
            .finish_non_exhaustive()
    }
}
