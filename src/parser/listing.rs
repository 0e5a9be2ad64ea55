//! Listing page parser for Gelbooru 0.1-style thumbnail grids
//!
//! Expected markup per entry:
//!
//! ```html
//! <span class="thumb">
//!   <a id="p123" href="index.php?page=post&amp;s=view&amp;id=123">
//!     <img src="..." title="tag_a tag_b score:15 rating:safe"/>
//!   </a>
//! </span>
//! ```

use super::SearchResultParser;
use crate::types::{CandidatePost, Stage};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use thiserror::Error;

#[allow(clippy::expect_used)]
static THUMB_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.thumb > a").expect("thumb selector is valid"));

#[allow(clippy::expect_used)]
static THUMB_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("image selector is valid"));

#[allow(clippy::expect_used)]
static SCORE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^score:\d+$").expect("score pattern is valid"));

/// Why a thumbnail entry was dropped
#[derive(Debug, Error)]
enum EntryError {
    #[error("post item without an id")]
    MissingId,
    #[error("post {id} has no thumbnail title")]
    MissingTitle { id: String },
    #[error("post {id} does not have a score")]
    MissingScore { id: String },
}

/// [`SearchResultParser`] for the site's HTML listing pages
#[derive(Clone, Debug)]
pub struct HtmlListingParser {
    base_url: String,
}

impl HtmlListingParser {
    /// Create a parser that qualifies links against `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    fn parse_entry(&self, anchor: ElementRef<'_>) -> Result<CandidatePost, EntryError> {
        let raw_id = anchor.value().attr("id").ok_or(EntryError::MissingId)?;
        let id = numeric_id(raw_id);

        let link = self.post_link(id, anchor.value().attr("href"));

        let title = anchor
            .select(&THUMB_IMAGE)
            .next()
            .and_then(|img| img.value().attr("title"))
            .ok_or_else(|| EntryError::MissingTitle { id: id.to_string() })?;

        let score =
            parse_score(title).ok_or_else(|| EntryError::MissingScore { id: id.to_string() })?;

        Ok(CandidatePost { link, score })
    }

    fn post_link(&self, id: &str, href: Option<&str>) -> String {
        match href.map(str::trim).filter(|h| !h.is_empty()) {
            None => format!("{}/index.php?page=post&s=view&id={}", self.base_url, id),
            Some(absolute) if url::Url::parse(absolute).is_ok() => absolute.to_string(),
            Some(relative) => {
                let relative = relative.strip_prefix('/').unwrap_or(relative);
                format!("{}/{}", self.base_url, relative)
            }
        }
    }
}

impl SearchResultParser for HtmlListingParser {
    fn parse_listing(&self, html: &str) -> Vec<CandidatePost> {
        let document = Html::parse_document(html);

        let mut posts: Vec<CandidatePost> = document
            .select(&THUMB_ANCHOR)
            .filter_map(|anchor| match self.parse_entry(anchor) {
                Ok(post) => Some(post),
                Err(e) => {
                    tracing::warn!(stage = %Stage::Image, reason = %e, "Skipping listing entry");
                    None
                }
            })
            .collect();

        posts.sort_by(|a, b| b.score.cmp(&a.score));
        posts
    }
}

/// Anchor ids are `p<digits>`; the post id is the digits
fn numeric_id(raw: &str) -> &str {
    match raw.strip_prefix('p') {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => digits,
        _ => raw,
    }
}

/// First `score:<digits>` token of a thumbnail title
fn parse_score(title: &str) -> Option<u64> {
    let token = title
        .split_whitespace()
        .find(|token| SCORE_TOKEN.is_match(token))?;
    token["score:".len()..].parse().ok()
}
