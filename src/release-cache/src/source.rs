//! Where releases come from.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use url::Url;

use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};
use crate::http_client::create_default_client;
use crate::release::{Release, parse_release_list};

/// Media type requested from the releases API.
const RELEASES_MEDIA_TYPE: &str = "application/vnd.github.preview";

/// Releases requested per list call.
const PER_PAGE: u32 = 100;

/// Supplier of release lists and asset contents.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the release list, newest first.
    async fn fetch_releases(&self) -> CacheResult<Vec<Release>>;

    /// Fetch the body of an asset as text.
    async fn fetch_text(&self, url: &str) -> CacheResult<String>;
}

/// Client for the GitHub Releases API (or a compatible host).
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    account: String,
    repository: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client for the repository named in `config`.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            client: create_default_client(),
            base_url: config.api_base_url().to_string(),
            account: config.account.clone(),
            repository: config.repository.clone(),
            token: config.token.clone(),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the release list.
    pub fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases?per_page={}",
            self.base_url, self.account, self.repository, PER_PAGE
        )
    }

    /// Whether `url` is served by the API host; only then are credentials sent.
    pub fn is_api_url(&self, url: &str) -> bool {
        match (Url::parse(url), Url::parse(&self.base_url)) {
            (Ok(url), Ok(base)) => url.origin() == base.origin(),
            _ => false,
        }
    }

    fn authorize(&self, request: RequestBuilder, url: &str) -> RequestBuilder {
        match &self.token {
            Some(token) if self.is_api_url(url) => {
                request.header(AUTHORIZATION, format!("token {token}"))
            }
            _ => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> CacheResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| CacheError::ConnectionFailed {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CacheError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ReleaseSource for GitHubClient {
    async fn fetch_releases(&self) -> CacheResult<Vec<Release>> {
        let url = self.releases_url();
        let request = self.client.get(&url).header(ACCEPT, RELEASES_MEDIA_TYPE);
        let response = self.send(self.authorize(request, &url)).await?;
        let document: Value = response.json().await?;
        parse_release_list(document)
    }

    async fn fetch_text(&self, url: &str) -> CacheResult<String> {
        let request = self.client.get(url);
        let response = self.send(self.authorize(request, url)).await?;
        Ok(response.text().await?)
    }
}
