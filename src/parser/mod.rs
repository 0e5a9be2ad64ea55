//! Site markup parsers
//!
//! The pipeline only sees the two traits below, so the site's markup contract can change
//! (or be mocked in tests) without touching fetch or ranking code.

mod listing;
mod post;

pub use listing::HtmlListingParser;
pub use post::HtmlPostParser;

use crate::error::Result;
use crate::types::CandidatePost;

/// Extracts scored candidates from one listing page
pub trait SearchResultParser: Send + Sync {
    /// Parse every well-formed thumbnail on the page, sorted descending by score
    ///
    /// Malformed entries are skipped with a warning; a page without thumbnails yields an
    /// empty list.
    fn parse_listing(&self, html: &str) -> Vec<CandidatePost>;
}

/// Extracts the direct image URL from one post-detail page
pub trait PostDetailParser: Send + Sync {
    /// Return the absolute URL of the post's primary image
    ///
    /// `page_url` is the address the markup was fetched from, used to resolve relative sources.
    fn parse_image_url(&self, html: &str, page_url: &str) -> Result<String>;
}
