//! In-process fake image board built on wiremock

use super::fixtures::detail_page;
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Serves detail pages for any `id`, optionally delaying selected posts
struct DetailResponder {
    delays: HashMap<String, Duration>,
}

impl Respond for DetailResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id = query_value(request, "id").unwrap_or_default();
        let template = ResponseTemplate::new(200)
            .insert_header("Content-Type", "text/html; charset=utf-8")
            .set_body_string(detail_page(&id));
        match self.delays.get(&id) {
            Some(delay) => template.set_delay(*delay),
            None => template,
        }
    }
}

/// Serves `/images/{id}.png` with body `image-{id}`
struct ImageResponder;

impl Respond for ImageResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id = request
            .url
            .path()
            .trim_start_matches("/images/")
            .trim_end_matches(".png")
            .to_string();
        ResponseTemplate::new(200)
            .insert_header("Content-Type", "image/png")
            .set_body_bytes(format!("image-{id}").into_bytes())
    }
}

fn query_value(request: &Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// A mock board: listing pages by offset, detail pages and images for every post
pub struct FakeBoard {
    pub server: MockServer,
}

impl FakeBoard {
    /// Start an empty board
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to configure the pipeline with
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Serve `html` as the listing page at offset `pid`
    pub async fn listing(&self, pid: usize, html: String) {
        Mock::given(method("GET"))
            .and(path("/index.php"))
            .and(query_param("s", "list"))
            .and(query_param("pid", pid.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&self.server)
            .await;
    }

    /// Fail the listing page at offset `pid` with `status`
    pub async fn failing_listing(&self, pid: usize, status: u16) {
        Mock::given(method("GET"))
            .and(path("/index.php"))
            .and(query_param("s", "list"))
            .and(query_param("pid", pid.to_string()))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Serve detail pages for all posts, delaying the listed ids
    pub async fn detail_pages(&self, delays: HashMap<String, Duration>) {
        Mock::given(method("GET"))
            .and(path("/index.php"))
            .and(query_param("s", "view"))
            .respond_with(DetailResponder { delays })
            .mount(&self.server)
            .await;
    }

    /// Serve images (HEAD and GET) for all posts
    pub async fn images(&self) {
        Mock::given(path_regex(r"^/images/\d+\.png$"))
            .respond_with(ImageResponder)
            .mount(&self.server)
            .await;
    }

    /// Raw query strings of every listing request received
    pub async fn listing_queries(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.query().is_some_and(|q| q.contains("s=list")))
            .filter_map(|r| r.url.query().map(str::to_string))
            .collect()
    }
}
