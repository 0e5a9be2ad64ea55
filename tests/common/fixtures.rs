//! Markup fixtures and test configuration

use booru_rank_dl::{Config, RetryConfig};
use std::time::Duration;

/// One thumbnail entry linking to post `id`, scored `score`
pub fn thumb(id: u32, score: u64) -> String {
    format!(
        r#"<span id="s{id}" class="thumb"><a id="p{id}" href="index.php?page=post&amp;s=view&amp;id={id}"><img src="/thumbnails/{id}.jpg" alt="cat" border="0" title=" cat dog score:{score} rating:safe" class="preview"/></a></span>"#
    )
}

/// Thumbnail entry whose title carries no score token
pub fn unscored_thumb(id: u32) -> String {
    format!(
        r#"<span id="s{id}" class="thumb"><a id="p{id}" href="index.php?page=post&amp;s=view&amp;id={id}"><img src="/thumbnails/{id}.jpg" title=" cat dog rating:safe" class="preview"/></a></span>"#
    )
}

/// Full listing page wrapping the given entries
pub fn listing_page(entries: &[String]) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>Listing</title></head><body><div id="post-list"><div class="content"><div>{}</div><div id="paginator"></div></div></div></body></html>"#,
        entries.concat()
    )
}

/// Detail page whose primary image lives at `/images/{id}.png`
pub fn detail_page(id: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><body><div id="right-col"><div class="flexi"><img alt="cat" height="800" id="image" src="/images/{id}.png" width="600"/></div></div></body></html>"#
    )
}

/// Configuration pointing at `base_url` with millisecond retries
pub fn test_config(base_url: String) -> Config {
    Config {
        base_url,
        request_timeout: Duration::from_millis(500),
        retry: RetryConfig {
            max_retries: 4,
            unit: Duration::from_millis(1),
            max_delay: Duration::from_millis(20),
            jitter: true,
        },
        ..Default::default()
    }
}
