use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::FetchError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Shared upstream client. Built once at startup and handed to every source.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
            ),
        );

        let mut builder = reqwest::ClientBuilder::new()
            .connect_timeout(std::time::Duration::from_secs(5))
            .timeout(config.http_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT)
            .default_headers(headers);

        if config.insecure_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let inner = builder
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self { inner })
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_html(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send(url).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        if !content_type.contains("text/html") {
            return Err(FetchError::NotHtml);
        }

        response.text().await.map_err(FetchError::from_reqwest)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self
            .send(url)
            .await?
            .text()
            .await
            .map_err(FetchError::from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| FetchError::InvalidJson(e.to_string()))
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "Upstream responded");
        if !status.is_success() {
            return Err(FetchError::Upstream(status.as_u16()));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn client() -> HttpClient {
        HttpClient::new(&Config::default()).unwrap()
    }

    #[tokio::test]
    async fn test_get_html_returns_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<p>hi</p>")
            .create_async()
            .await;

        let body = client().get_html(&format!("{}/page", server.url())).await.unwrap();
        assert_eq!(body, "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_get_html_rejects_non_html() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let err = client()
            .get_html(&format!("{}/data", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotHtml));
    }

    #[tokio::test]
    async fn test_error_status_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let err = client()
            .get_json::<Value>(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Upstream(404)));
    }

    #[tokio::test]
    async fn test_get_json_rejects_garbage() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json")
            .create_async()
            .await;

        let err = client()
            .get_json::<Value>(&format!("{}/api", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidJson(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let err = client()
            .get_html("http://127.0.0.1:1/nothing")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
    }
}
