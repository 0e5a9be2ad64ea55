//! Retrying HTTP fetcher
//!
//! Thin wrapper around a shared [`reqwest::Client`]. Buffered calls run under [`with_retry`]
//! with `request_timeout` as a whole-request limit, and a call that ends in failure reports
//! [`Error::Fetch`] with the last attempt's cause.
//!
//! Streams are opened with a single attempt and have no total limit: `request_timeout` bounds
//! the wait for the headers and, through [`Fetcher::next_chunk`], the gap between body chunks.
//! Callers retry the whole stream.

use crate::config::{Config, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::with_retry;
use reqwest::header::HeaderMap;
use reqwest::{Client, Response};
use std::time::Duration;

/// HTTP client with bounded exponential-backoff retry
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
    retry: RetryConfig,
    request_timeout: Duration,
}

impl Fetcher {
    /// Build a fetcher from the run configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_client(
            client,
            config.retry.clone(),
            config.request_timeout,
        ))
    }

    /// Build a fetcher around an existing client
    pub fn with_client(client: Client, retry: RetryConfig, request_timeout: Duration) -> Self {
        Self {
            client,
            retry,
            request_timeout,
        }
    }

    /// Retry policy shared by every call
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// GET `url` and buffer the body as text
    pub async fn get_text(&self, url: &str) -> Result<String> {
        with_retry(&self.retry, move || async move {
            let request = self.client.get(url).timeout(self.request_timeout);
            let response = self.send_checked(request, url).await?;
            Ok::<_, Error>(response.text().await?)
        })
        .await
        .map_err(|e| e.into_fetch(url))
    }

    /// HEAD `url` and return its response headers
    pub async fn head(&self, url: &str) -> Result<HeaderMap> {
        with_retry(&self.retry, move || async move {
            let request = self.client.head(url).timeout(self.request_timeout);
            let response = self.send_checked(request, url).await?;
            Ok::<_, Error>(response.headers().clone())
        })
        .await
        .map_err(|e| e.into_fetch(url))
    }

    /// GET `url` for streaming in a single attempt; the status is checked, the body is left unread
    pub async fn open_stream(&self, url: &str) -> Result<Response> {
        tokio::time::timeout(
            self.request_timeout,
            self.send_checked(self.client.get(url), url),
        )
        .await
        .map_err(|_| self.stalled(url))?
    }

    /// Next body chunk of a stream opened with [`Fetcher::open_stream`]
    ///
    /// Fails with [`Error::Timeout`] when no data arrives within `request_timeout`.
    pub async fn next_chunk(
        &self,
        response: &mut Response,
        url: &str,
    ) -> Result<Option<Vec<u8>>> {
        let chunk = tokio::time::timeout(self.request_timeout, response.chunk())
            .await
            .map_err(|_| self.stalled(url))??;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }

    fn stalled(&self, url: &str) -> Error {
        Error::Timeout {
            url: url.to_string(),
            after: self.request_timeout,
        }
    }

    async fn send_checked(&self, request: reqwest::RequestBuilder, url: &str) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_fetcher(max_retries: u32) -> Fetcher {
        let config = Config {
            request_timeout: Duration::from_millis(500),
            retry: RetryConfig {
                max_retries,
                unit: Duration::from_millis(1),
                max_delay: Duration::from_millis(50),
                jitter: false,
            },
            ..Default::default()
        };
        Fetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn get_text_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let body = fast_fetcher(4)
            .get_text(&format!("{}/index.php", server.uri()))
            .await
            .unwrap();

        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn server_errors_are_retried_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
            .mount(&server)
            .await;

        let body = fast_fetcher(4)
            .get_text(&format!("{}/flaky", server.uri()))
            .await
            .unwrap();

        assert_eq!(body, "recovered");
    }

    #[tokio::test]
    async fn exhausted_retries_report_fetch_error_with_last_cause() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500))
            .expect(5)
            .mount(&server)
            .await;

        let url = format!("{}/down", server.uri());
        let err = fast_fetcher(4).get_text(&url).await.unwrap_err();

        match err {
            Error::Fetch { url: failed, source } => {
                assert_eq!(failed, url);
                assert!(matches!(*source, Error::HttpStatus { status: 500, .. }));
            }
            other => panic!("expected Fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let result = fast_fetcher(4)
            .get_text(&format!("{}/missing", server.uri()))
            .await;

        assert!(matches!(result, Err(Error::Fetch { .. })));
    }

    #[tokio::test]
    async fn timeouts_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .expect(3)
            .mount(&server)
            .await;

        let result = fast_fetcher(2)
            .get_text(&format!("{}/slow", server.uri()))
            .await;

        match result {
            Err(Error::Fetch { source, .. }) => match *source {
                Error::Network(e) => assert!(e.is_timeout()),
                other => panic!("expected timeout, got {other:?}"),
            },
            other => panic!("expected Fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn head_returns_headers() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/img.png"))
            .respond_with(ResponseTemplate::new(200).insert_header("Content-Type", "image/png"))
            .mount(&server)
            .await;

        let headers = fast_fetcher(0)
            .head(&format!("{}/img.png", server.uri()))
            .await
            .unwrap();

        assert_eq!(headers.get("content-type").unwrap(), "image/png");
    }

    #[tokio::test]
    async fn open_stream_checks_status_without_retrying() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img.png"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let result = fast_fetcher(4)
            .open_stream(&format!("{}/img.png", server.uri()))
            .await;

        assert!(matches!(result, Err(Error::HttpStatus { status: 503, .. })));
    }

    #[tokio::test]
    async fn open_stream_times_out_waiting_for_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img.png"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let result = fast_fetcher(0)
            .open_stream(&format!("{}/img.png", server.uri()))
            .await;

        assert!(matches!(result, Err(Error::Timeout { .. })));
    }

    #[tokio::test]
    async fn next_chunk_reads_body_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pixels".to_vec()))
            .mount(&server)
            .await;
        let fetcher = fast_fetcher(0);
        let url = format!("{}/img.png", server.uri());

        let mut response = fetcher.open_stream(&url).await.unwrap();
        let mut body = Vec::new();
        while let Some(chunk) = fetcher.next_chunk(&mut response, &url).await.unwrap() {
            body.extend_from_slice(&chunk);
        }

        assert_eq!(body, b"pixels");
    }
}
