//! Utility functions for output naming and response metadata

use crate::error::{Error, MalformedContentError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Maximum number of suffixes tried when looking for a free output directory name
const MAX_NAME_ATTEMPTS: u32 = 9999;

#[allow(clippy::expect_used)]
static POST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=(\d+)").expect("post id pattern is valid"));

/// Pick the first free name among `base`, `base1`, `base2`, ...
///
/// `exists` decides whether a candidate is taken, which keeps this function free of
/// filesystem access.
///
/// # Examples
///
/// ```
/// use booru_rank_dl::utils::next_available_name;
///
/// let taken = ["output", "output1"];
/// let name = next_available_name("output", |name| taken.contains(&name));
/// assert_eq!(name.as_deref(), Some("output2"));
/// ```
pub fn next_available_name<F>(base: &str, mut exists: F) -> Option<String>
where
    F: FnMut(&str) -> bool,
{
    if !exists(base) {
        return Some(base.to_string());
    }
    (1..=MAX_NAME_ATTEMPTS)
        .map(|i| format!("{}{}", base, i))
        .find(|candidate| !exists(candidate))
}

/// Create a fresh output directory under `parent`, never reusing an existing one
pub fn create_output_dir(parent: &Path, base: &str) -> Result<PathBuf> {
    // create_dir fails on an existing path, so a name taken between the check and the
    // create moves on to the next suffix instead of sharing the directory
    let mut taken: Vec<String> = Vec::new();
    loop {
        let name = next_available_name(base, |name| {
            taken.iter().any(|t| t == name) || parent.join(name).exists()
        })
        .ok_or_else(|| Error::Io(std::io::Error::other(format!(
            "no free output directory name for {} after {} attempts",
            base, MAX_NAME_ATTEMPTS
        ))))?;

        let path = parent.join(&name);
        match std::fs::create_dir(&path) {
            Ok(()) => return Ok(path),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => taken.push(name),
            Err(e) => return Err(e.into()),
        }
    }
}

/// File extension from a content type's subtype (`image/jpeg; q=1` gives `jpeg`)
pub fn extension_from_content_type(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim();
    let (_, subtype) = essence.split_once('/')?;
    let subtype = subtype.trim();
    if subtype.is_empty() {
        return None;
    }
    Some(subtype.to_ascii_lowercase())
}

/// Numeric post id from a post-detail link (`...&id=123` gives `123`)
///
/// Only a whole `id` query parameter counts, so `pid=42` is never mistaken for it.
pub fn extract_post_id(link: &str) -> Result<String> {
    POST_ID
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            MalformedContentError::MissingPostId {
                link: link.to_string(),
            }
            .into()
        })
}
