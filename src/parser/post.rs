//! Post-detail page parser

use super::PostDetailParser;
use crate::error::{MalformedContentError, Result};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

#[allow(clippy::expect_used)]
static PRIMARY_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img#image").expect("primary image selector is valid"));

/// [`PostDetailParser`] reading the `img#image` element
///
/// Video and flash posts have no such element and fail with
/// [`MalformedContentError::MissingImage`].
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlPostParser;

impl PostDetailParser for HtmlPostParser {
    fn parse_image_url(&self, html: &str, page_url: &str) -> Result<String> {
        let src = {
            let document = Html::parse_document(html);
            let image = document.select(&PRIMARY_IMAGE).next().ok_or_else(|| {
                MalformedContentError::MissingImage {
                    page_url: page_url.to_string(),
                }
            })?;
            image
                .value()
                .attr("src")
                .map(str::trim)
                .filter(|src| !src.is_empty())
                .ok_or_else(|| MalformedContentError::MissingImageSource {
                    page_url: page_url.to_string(),
                })?
                .to_string()
        };

        Ok(Url::parse(page_url)?.join(&src)?.to_string())
    }
}
