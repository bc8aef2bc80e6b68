//! Tier-1 HTTP client with a browser-like header set.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{PageFetcher, RawResponse};
use crate::config::HttpSettings;
use crate::error::FetchError;

/// Plain HTTP page fetcher.
///
/// Cookies are not persisted between requests and every request carries the
/// same headers, so pages can be fetched concurrently from one client.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client from HTTP settings.
    pub fn new(settings: &HttpSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&settings.user_agent)
            .default_headers(default_headers(settings))
            .timeout(settings.timeout())
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

fn default_headers(settings: &HttpSettings) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let mut insert = |name: HeaderName, value: &str| {
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(name, value);
        }
    };
    insert(ACCEPT, &settings.accept);
    insert(ACCEPT_LANGUAGE, &settings.accept_language);
    insert(REFERER, &settings.referer);
    headers.insert("DNT", HeaderValue::from_static("1"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
    headers
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        debug!("GET {} -> {}", url, status);

        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HttpClient {
        HttpClient::new(&HttpSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_sends_browser_headers_and_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/internships"))
            .and(header("referer", "https://internshala.com/"))
            .and(headers("accept-language", vec!["en-US", "en;q=0.5"]))
            .and(header("dnt", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>listings</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let response = client()
            .get(&format!("{}/internships", server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "<html>listings</html>");
    }

    #[tokio::test]
    async fn test_non_200_status_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("blocked"))
            .mount(&server)
            .await;

        let err = client().get(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(403)));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let settings = HttpSettings {
            timeout_secs: 1,
            ..HttpSettings::default()
        };
        let err = HttpClient::new(&settings)
            .unwrap()
            .get(&server.uri())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout));
    }
}
