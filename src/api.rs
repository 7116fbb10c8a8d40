//! Client for the portfolio server endpoints the shell talks to.
//!
//! The shell only depends on the [`Api`] trait; [`HttpApi`] is the reqwest
//! implementation used by the binary. Privileged calls take an
//! [`ElevationContext`] so they cannot be issued without a verified secret.

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::Deserialize;

use crate::config::Config;
use crate::shell::elevation::ElevationContext;
use crate::util::PickedFile;
use crate::{flog_debug, flog_warn, Error, Result};

pub const SUDO_PATH: &str = "/api/sudo";
pub const VERSION_PATH: &str = "/api/version";
pub const UPDATE_SERVER_PATH: &str = "/api/update_server";
pub const AUTHENTICATE_PATH: &str = "/api/authenticate";
pub const PURGE_CACHE_PATH: &str = "/api/purge_cache";
pub const PURGE_ALL_CACHE_PATH: &str = "/api/purge_all_cache";
pub const BLOG_PATH: &str = "/api/blog";

/// A blog post collected by `post-blog`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogDraft {
    pub title: String,
    pub summary: String,
    pub content: PickedFile,
}

/// Remote endpoints consumed by command handlers.
#[async_trait]
pub trait Api: Send + Sync {
    /// Elevation check. `Ok` only for a 2xx answer.
    async fn verify_secret(&self, secret: &str) -> Result<()>;

    async fn version(&self) -> Result<String>;

    async fn update_server(&self, elevation: &ElevationContext) -> Result<()>;

    /// Returns the access token for the protected analytics page.
    async fn authenticate(&self, elevation: &ElevationContext) -> Result<String>;

    async fn purge_cache(&self, elevation: &ElevationContext, paths: &[String]) -> Result<()>;

    async fn purge_all_cache(&self, elevation: &ElevationContext) -> Result<()>;

    async fn post_blog(&self, elevation: &ElevationContext, draft: BlogDraft) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// reqwest-backed [`Api`].
pub struct HttpApi {
    client: Client,
    base: String,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base: config.effective_api_base().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn post_elevated(&self, path: &str, elevation: &ElevationContext) -> Result<Response> {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(elevation.bearer())
            .send()
            .await?;
        ensure_success(path, resp)
    }
}

fn ensure_success(endpoint: &str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        flog_debug!("{} -> {}", endpoint, status);
        Ok(resp)
    } else {
        flog_warn!("{} rejected with {}", endpoint, status);
        Err(Error::Api {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Normalise user-typed purge paths: drop blanks, force a leading `/`.
pub fn normalize_paths<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    raw.into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.starts_with('/') {
                p.to_string()
            } else {
                format!("/{p}")
            }
        })
        .collect()
}

#[async_trait]
impl Api for HttpApi {
    async fn verify_secret(&self, secret: &str) -> Result<()> {
        let resp = self
            .client
            .post(self.url(SUDO_PATH))
            .bearer_auth(secret)
            .send()
            .await?;
        ensure_success(SUDO_PATH, resp).map(|_| ())
    }

    async fn version(&self) -> Result<String> {
        let resp = self.client.get(self.url(VERSION_PATH)).send().await?;
        let parsed: VersionResponse = ensure_success(VERSION_PATH, resp)?.json().await?;
        Ok(parsed.version)
    }

    async fn update_server(&self, elevation: &ElevationContext) -> Result<()> {
        self.post_elevated(UPDATE_SERVER_PATH, elevation)
            .await
            .map(|_| ())
    }

    async fn authenticate(&self, elevation: &ElevationContext) -> Result<String> {
        let resp = self.post_elevated(AUTHENTICATE_PATH, elevation).await?;
        let parsed: TokenResponse = resp.json().await?;
        Ok(parsed.token)
    }

    async fn purge_cache(&self, elevation: &ElevationContext, paths: &[String]) -> Result<()> {
        let body = serde_json::json!({ "paths": paths });
        let resp = self
            .client
            .post(self.url(PURGE_CACHE_PATH))
            .bearer_auth(elevation.bearer())
            .json(&body)
            .send()
            .await?;
        ensure_success(PURGE_CACHE_PATH, resp).map(|_| ())
    }

    async fn purge_all_cache(&self, elevation: &ElevationContext) -> Result<()> {
        self.post_elevated(PURGE_ALL_CACHE_PATH, elevation)
            .await
            .map(|_| ())
    }

    async fn post_blog(&self, elevation: &ElevationContext, draft: BlogDraft) -> Result<()> {
        let file_part = multipart::Part::bytes(draft.content.bytes)
            .file_name(draft.content.file_name)
            .mime_str("text/markdown")?;

        let form = multipart::Form::new()
            .text("title", draft.title)
            .text("summary", draft.summary)
            .part("content_file", file_part);

        let resp = self
            .client
            .post(self.url(BLOG_PATH))
            .bearer_auth(elevation.bearer())
            .multipart(form)
            .send()
            .await?;
        ensure_success(BLOG_PATH, resp).map(|_| ())
    }
}
