//! Core types for booru-rank-dl

use std::path::PathBuf;

/// A sanitized search tag
///
/// Never contains whitespace. Tag order is significant because tags are joined
/// into the listing query in the order given.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchTag(pub(crate) String);

impl SearchTag {
    /// Get the tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SearchTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A post found on a listing page, before global ranking
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidatePost {
    /// Absolute URL of the post-detail page
    pub link: String,
    /// Popularity score taken from the thumbnail title
    pub score: u64,
}

/// A candidate with its position in the globally sorted, truncated list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedPost {
    /// Zero-based position in the top list
    pub rank: usize,
    /// The ranked candidate
    pub post: CandidatePost,
}

/// Everything needed to write one image to disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Rank of the post this image belongs to
    pub rank: usize,
    /// Numeric post identifier taken from the post link
    pub post_id: String,
    /// Direct image URL
    pub image_url: String,
    /// File extension derived from the content type
    pub extension: String,
}

impl DownloadTarget {
    /// Output file name: `<rank>-<postId>.<ext>`
    pub fn file_name(&self) -> String {
        format!("{}-{}.{}", self.rank, self.post_id, self.extension)
    }
}

/// Pipeline stage a warning originates from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Listing page fetch
    Page,
    /// Post-detail fetch or parse
    Post,
    /// Listing entry, image probe, stream or write
    Image,
}

impl Stage {
    /// Tag used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Page => "PAGE",
            Stage::Post => "POST",
            Stage::Image => "IMAGE",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal report of a run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Listing pages requested
    pub pages_requested: usize,
    /// Listing pages that could not be fetched
    pub pages_failed: usize,
    /// Candidates merged from all successful pages
    pub candidates: usize,
    /// Posts kept after ranking and truncation
    pub ranked: usize,
    /// Images written to disk
    pub downloaded: usize,
    /// Ranked posts that did not produce a file
    pub posts_failed: usize,
    /// Directory the run wrote into
    pub output_dir: PathBuf,
}
