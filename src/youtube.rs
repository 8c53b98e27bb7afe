use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;
use url::Url;

use crate::constants::constants;

/// Anything that can answer a search query with raw provider items.
///
/// Items are returned unparsed; the caller decides which ones are videos.
#[async_trait]
pub trait SearchProvider: Send + Sync {
  async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Value>>;
}

#[derive(Deserialize)]
struct SearchResponse {
  #[serde(default)]
  items: Vec<Value>,
}

/// YouTube Data API v3 search client.
pub struct YouTubeClient {
  http: Client,
  endpoint: Url,
  api_key: String,
}

impl fmt::Debug for YouTubeClient {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("YouTubeClient").field("endpoint", &self.endpoint.as_str()).field("api_key", &"<redacted>").finish()
  }
}

impl YouTubeClient {
  pub fn new(api_key: String) -> Result<Self> {
    let endpoint = Url::parse(&constants().search_endpoint).context("Invalid search endpoint in constants.ron")?;
    Ok(Self { http: Client::new(), endpoint, api_key })
  }

  /// Client against a local endpoint, bypassing any configured proxy.
  #[cfg(test)]
  pub fn with_endpoint(api_key: &str, endpoint: Url) -> Result<Self> {
    let http = Client::builder().no_proxy().build().context("Failed to build HTTP client")?;
    Ok(Self { http, endpoint, api_key: api_key.to_string() })
  }

  /// Build the request URL. Contains the API key, so never log the result.
  /// reqwest errors embed the request URL; strip it with `without_url`
  /// before they leave this module.
  fn request_url(&self, query: &str, max_results: usize) -> Url {
    let mut url = self.endpoint.clone();
    url
      .query_pairs_mut()
      .append_pair("key", &self.api_key)
      .append_pair("part", &constants().search_part)
      .append_pair("q", query)
      .append_pair("maxResults", &max_results.to_string());
    url
  }
}

#[async_trait]
impl SearchProvider for YouTubeClient {
  async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Value>> {
    debug!(query = %query, max_results, endpoint = %self.endpoint, "search: requesting");
    let response: SearchResponse = self
      .http
      .get(self.request_url(query, max_results))
      .send()
      .await
      .map_err(reqwest::Error::without_url)
      .context("Failed to send search request")?
      .error_for_status()
      .map_err(reqwest::Error::without_url)
      .context("Search request returned an error status")?
      .json()
      .await
      .map_err(reqwest::Error::without_url)
      .context("Failed to parse search response JSON")?;
    Ok(response.items)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  const KEY: &str = "SUPERSECRETKEY";

  /// Serve one canned HTTP response on a local port and return the endpoint.
  async fn serve_once(status_line: &'static str, body: &'static str) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut request = Vec::new();
      let mut buf = [0u8; 1024];
      while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
          break;
        }
        request.extend_from_slice(&buf[..n]);
      }
      let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
      );
      socket.write_all(response.as_bytes()).await.unwrap();
      socket.shutdown().await.unwrap();
    });
    Url::parse(&format!("http://{}/youtube/v3/search", addr)).unwrap()
  }

  /// Endpoint on a port nobody listens on.
  async fn refused_endpoint() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}/youtube/v3/search", addr)).unwrap()
  }

  #[tokio::test]
  async fn ok_response_returns_items() {
    let endpoint = serve_once("200 OK", r#"{"items":[{"id":{"kind":"youtube#video","videoId":"a"}}]}"#).await;
    let client = YouTubeClient::with_endpoint(KEY, endpoint).unwrap();
    let items = client.search("lofi", 10).await.unwrap();
    assert_eq!(items.len(), 1);
  }

  #[tokio::test]
  async fn error_status_is_a_failure_without_key() {
    let endpoint = serve_once("403 Forbidden", r#"{"error":{"code":403}}"#).await;
    let client = YouTubeClient::with_endpoint(KEY, endpoint).unwrap();
    let err = client.search("lofi", 10).await.unwrap_err();
    let shown = format!("{:#}", err);
    assert!(shown.contains("403"), "{}", shown);
    assert!(!shown.contains(KEY), "{}", shown);
  }

  #[tokio::test]
  async fn connection_failure_does_not_leak_key() {
    let client = YouTubeClient::with_endpoint(KEY, refused_endpoint().await).unwrap();
    let err = client.search("lofi", 10).await.unwrap_err();
    let shown = format!("{:#} {:?}", err, err);
    assert!(!shown.contains(KEY), "{}", shown);
  }

  #[tokio::test]
  async fn invalid_json_does_not_leak_key() {
    let endpoint = serve_once("200 OK", "not json").await;
    let client = YouTubeClient::with_endpoint(KEY, endpoint).unwrap();
    let err = client.search("lofi", 10).await.unwrap_err();
    assert!(!format!("{:#}", err).contains(KEY));
  }

  #[test]
  fn request_url_carries_all_parameters() {
    let client = YouTubeClient::new("secret".to_string()).unwrap();
    let url = client.request_url("lofi & chill", 10);
    let pairs: Vec<(String, String)> = url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
    assert_eq!(url.host_str(), Some("www.googleapis.com"));
    assert_eq!(url.path(), "/youtube/v3/search");
    assert_eq!(
      pairs,
      vec![
        ("key".to_string(), "secret".to_string()),
        ("part".to_string(), "id,snippet".to_string()),
        ("q".to_string(), "lofi & chill".to_string()),
        ("maxResults".to_string(), "10".to_string()),
      ]
    );
  }

  #[test]
  fn debug_redacts_api_key() {
    let client = YouTubeClient::new("super-secret-key".to_string()).unwrap();
    let shown = format!("{:?}", client);
    assert!(!shown.contains("super-secret-key"));
    assert!(shown.contains("<redacted>"));
  }

  #[test]
  fn response_without_items_is_empty() {
    let response: SearchResponse = serde_json::from_str("{\"kind\":\"youtube#searchListResponse\"}").unwrap();
    assert!(response.items.is_empty());
  }
}
