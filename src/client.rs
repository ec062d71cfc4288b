use std::sync::Arc;

use anyhow::Context;
use log::debug;
use reqwest::{
    cookie::Jar,
    header::{
        HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, UPGRADE_INSECURE_REQUESTS, USER_AGENT,
    },
    Client, StatusCode, Url,
};

use crate::error::{OrlyError, Result};

pub const DEFAULT_BASE_URL: &str = "https://learning.oreilly.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

/// Anything able to GET a document. The resolver and the chapter fetcher only
/// talk to the platform through this.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Absolute url of an api endpoint, e.g. `api/v1/book/123/`.
    fn api_url(&self, endpoint: &str) -> Result<Url>;

    /// Body of a successful (2xx) response.
    async fn get_text(&self, url: &Url) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.parse().expect("correct base url"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

pub struct OreillyClient {
    client: Client,
    base_url: Url,
}

impl OreillyClient {
    pub fn new(config: ClientConfig, cookies: Jar) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json,text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("invalid user agent")?,
        );

        Ok(Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .cookie_provider(Arc::new(cookies))
                .build()?,
            base_url: config.base_url,
        })
    }

    fn make_url(&self, endpoint: &str) -> Result<Url> {
        Ok(self
            .base_url
            .join(endpoint)
            .with_context(|| format!("invalid endpoint: {}", endpoint))?)
    }

    /// Probes an endpoint that requires a valid session.
    pub async fn check_login(&self) -> Result<()> {
        let response = self
            .client
            .get(self.make_url("api/v2/user/")?)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(OrlyError::AuthenticationFailed(format!(
                    "server responded with {}, your cookies might be expired",
                    response.status()
                )))
            }
            _ => Ok(()),
        }
    }
}

impl Fetch for OreillyClient {
    fn api_url(&self, endpoint: &str) -> Result<Url> {
        self.make_url(endpoint)
    }

    async fn get_text(&self, url: &Url) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrlyError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.text().await?)
    }
}
