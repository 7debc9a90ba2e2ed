//! HTTP Search Backend
//!
//! Talks to the recipe-search service over its REST API. Route shapes follow
//! the service's per-algorithm endpoints:
//!
//! - `GET {base}/elements/` for the element catalog
//! - `GET {base}/bfs-tree/{target}?count={n}&singlePath=false`
//! - `GET {base}/dfs-tree/{target}?count={n}`
//! - `GET {base}/bidirectional/{target}?count={n}&multithreaded=true&tree=true`

use std::time::Duration;

use async_trait::async_trait;

use crate::catalog::ElementData;
use crate::sequence::Algorithm;
use crate::tree::RawSearchResult;

use super::escape_path_segment;
use super::traits::SearchBackend;

/// Default backend base URL
const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// HTTP client for the recipe-search service
#[derive(Clone, Debug)]
pub struct HttpSearchBackend {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpSearchBackend {
    /// Create a backend for a base URL (e.g. `http://localhost:8080/api`)
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Create from the `ALCHETREE_API_URL` environment variable
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("ALCHETREE_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// The configured base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn catalog_url(&self) -> String {
        format!("{}/elements/", self.base_url)
    }

    fn search_url(&self, target: &str, algorithm: Algorithm, count: usize) -> String {
        let target = escape_path_segment(target);
        match algorithm {
            Algorithm::Bfs => format!(
                "{}/bfs-tree/{target}?count={count}&singlePath=false",
                self.base_url
            ),
            Algorithm::Dfs => format!("{}/dfs-tree/{target}?count={count}", self.base_url),
            Algorithm::Bidirectional => format!(
                "{}/bidirectional/{target}?count={count}&multithreaded=true&tree=true",
                self.base_url
            ),
        }
    }
}

impl Default for HttpSearchBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(self.catalog_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }

    async fn load_catalog(&self) -> anyhow::Result<Vec<ElementData>> {
        let response = self
            .http_client
            .get(self.catalog_url())
            .send()
            .await?
            .error_for_status()?;
        let elements: Vec<ElementData> = response.json().await?;
        tracing::debug!(count = elements.len(), "catalog loaded");
        Ok(elements)
    }

    async fn run_search(
        &self,
        target: &str,
        algorithm: Algorithm,
        count: usize,
    ) -> anyhow::Result<RawSearchResult> {
        let url = self.search_url(target, algorithm, count);
        tracing::debug!(%url, "search request");
        let response = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?;
        let result: RawSearchResult = response.json().await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_per_algorithm() {
        let backend = HttpSearchBackend::new("http://localhost:8080/api/");
        assert_eq!(
            backend.search_url("Brick", Algorithm::Bfs, 3),
            "http://localhost:8080/api/bfs-tree/Brick?count=3&singlePath=false"
        );
        assert_eq!(
            backend.search_url("Brick", Algorithm::Dfs, 1),
            "http://localhost:8080/api/dfs-tree/Brick?count=1"
        );
        assert_eq!(
            backend.search_url("Brick", Algorithm::Bidirectional, 2),
            "http://localhost:8080/api/bidirectional/Brick?count=2&multithreaded=true&tree=true"
        );
    }

    #[test]
    fn test_target_escaping_in_url() {
        let backend = HttpSearchBackend::new("http://h/api");
        let url = backend.search_url("Molten Lava", Algorithm::Bfs, 1);
        assert!(url.contains("Molten%20Lava"));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend = HttpSearchBackend::new("http://h/api///");
        assert_eq!(backend.base_url(), "http://h/api");
    }
}
