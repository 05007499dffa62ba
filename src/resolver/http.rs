use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::{Client, Response, redirect};
use tracing::debug;
use url::Url;

use super::fetcher::{FetchedResource, PlaylistFetcher};
use crate::config::ResolverConfig;
use crate::errors::{AppResult, ResolveError, ResolveResult};
use crate::utils::UrlUtils;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// reqwest-backed fetcher used in production.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &ResolverConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self::with_client(client, config.max_playlist_bytes))
    }

    /// Wrap an existing client (callers can reuse a global instance).
    pub fn with_client(client: Client, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }
}

#[async_trait]
impl PlaylistFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> ResolveResult<Box<dyn FetchedResource>> {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        let parsed = Url::parse(url)
            .map_err(|e| ResolveError::invalid_url(safe_url.clone(), e.to_string()))?;

        debug!(target: "resolver", url = %safe_url, "fetching");

        let response = self
            .client
            .get(parsed)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| {
                ResolveError::request(
                    safe_url.clone(),
                    UrlUtils::obfuscate_credentials(&e.to_string()),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                url: UrlUtils::obfuscate_credentials(response.url().as_str()),
                status: status.as_u16(),
            });
        }

        Ok(Box::new(HttpResource::new(response, self.max_body_bytes)))
    }
}

struct HttpResource {
    final_url: Url,
    content_type: Option<String>,
    response: Response,
    max_body_bytes: usize,
}

impl HttpResource {
    fn new(response: Response, max_body_bytes: usize) -> Self {
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Self {
            final_url,
            content_type,
            response,
            max_body_bytes,
        }
    }
}

#[async_trait]
impl FetchedResource for HttpResource {
    fn final_url(&self) -> &Url {
        &self.final_url
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    async fn text(self: Box<Self>) -> ResolveResult<String> {
        let HttpResource {
            final_url,
            response,
            max_body_bytes: limit,
            ..
        } = *self;
        let url = UrlUtils::obfuscate_credentials(final_url.as_str());

        // Stream body in chunks, stop at the limit
        let mut body = response.bytes_stream();
        let mut collected: Vec<u8> = Vec::with_capacity(8192.min(limit));
        let mut truncated = false;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| ResolveError::body(url.clone(), e.to_string()))?;
            if collected.len() + chunk.len() > limit {
                collected.extend_from_slice(&chunk[..(limit - collected.len())]);
                debug!(target: "resolver", url = %url, limit, "playlist body truncated");
                truncated = true;
                break;
            }
            collected.extend_from_slice(&chunk);
        }

        Ok(decode_body(collected, truncated))
    }
}

/// Decode a playlist body as lossy UTF-8 without its byte order mark.
///
/// A truncated body keeps complete lines only: the line cut by the limit is
/// not a usable reference.
fn decode_body(mut bytes: Vec<u8>, truncated: bool) -> String {
    if truncated {
        let complete = bytes
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);
        bytes.truncate(complete);
    }
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes.as_slice());
    String::from_utf8_lossy(bytes).into_owned()
}
