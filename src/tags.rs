//! Search tag sanitization
//!
//! Tags come straight from the command line. A multi-word tag such as `"long hair"` is the
//! site's `long_hair`, so whitespace runs are collapsed into a single underscore. Nothing is
//! percent-encoded: the site expects booru syntax (`-tag`, `rating:safe`, `score:>10`) verbatim.

use crate::types::SearchTag;
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Sanitize raw tag arguments, preserving order and count
///
/// # Examples
///
/// ```
/// use booru_rank_dl::tags::sanitize_tags;
///
/// let tags = sanitize_tags(["long hair", "cat"]);
/// assert_eq!(tags[0].as_str(), "long_hair");
/// assert_eq!(tags[1].as_str(), "cat");
/// ```
pub fn sanitize_tags<I, S>(args: I) -> Vec<SearchTag>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter().map(|arg| sanitize_tag(arg.as_ref())).collect()
}

/// Sanitize a single tag
pub fn sanitize_tag(raw: &str) -> SearchTag {
    SearchTag(WHITESPACE_RUN.replace_all(raw, "_").into_owned())
}

/// Join tags into the listing query value (`cat+dog`)
pub fn join_tags(tags: &[SearchTag]) -> String {
    tags.iter()
        .map(SearchTag::as_str)
        .collect::<Vec<_>>()
        .join("+")
}
