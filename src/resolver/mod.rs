/*!
 * Stream Resolver
 * ===============
 *
 * Turns a candidate media URL into the URL that should actually be played:
 *
 *   1. GET the URL (redirects followed, no caching) and keep the final URL.
 *   2. If the response is not a playlist (by path suffix or content type),
 *      the final URL is the answer.
 *   3. Otherwise read the body and take the first non-directive line as a
 *      reference relative to the final URL. A reference that is itself a
 *      manifest (and not the URL we started from) is resolved again, one
 *      level deeper; anything else is the answer.
 *
 * Resolution never fails. Each step has a fallback URL (the input of that
 * step) which becomes the result when the step errors, and the loop stops
 * unconditionally once `depth > max_depth`.
 */

pub mod fetcher;
pub mod http;
pub mod playlist;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::config::ResolverConfig;
use crate::config::defaults::DEFAULT_MAX_DEPTH;
use crate::errors::{AppResult, ResolveError};
use crate::metrics::{KeyValue, metrics};
use crate::utils::UrlUtils;

pub use fetcher::{FetchedResource, PlaylistFetcher};
pub use http::HttpFetcher;

/// Why a resolution stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Input was empty; returned as-is without a request
    EmptyInput,
    /// Nesting went past the depth bound
    DepthExceeded,
    /// Final response was not a playlist
    Leaf,
    /// Playlist body was empty
    EmptyPlaylist,
    /// First usable reference was not a nested manifest
    Reference,
    /// First usable reference pointed back at the original URL
    CycleGuard,
    /// Playlist had no usable reference line
    NoReference,
    /// A step failed; the result is that step's input
    Failed(ResolveError),
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::EmptyInput => "empty-input",
            Termination::DepthExceeded => "depth-exceeded",
            Termination::Leaf => "leaf",
            Termination::EmptyPlaylist => "empty-playlist",
            Termination::Reference => "reference",
            Termination::CycleGuard => "cycle-guard",
            Termination::NoReference => "no-reference",
            Termination::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Failed(err) => write!(f, "failed: {err}"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Outcome of a resolution call. `url` is always usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub url: String,
    pub depth: u32,
    pub requests: u32,
    pub termination: Termination,
}

impl Resolution {
    pub fn into_url(self) -> String {
        self.url
    }

    /// True when the URL is a fallback after a failed step.
    pub fn is_fallback(&self) -> bool {
        matches!(self.termination, Termination::Failed(_))
    }
}

/// Transient state carried through one resolution chain.
#[derive(Debug, Clone)]
pub struct ResolutionState {
    pub original_url: String,
    pub current_url: String,
    pub depth: u32,
    requests: u32,
    original_parsed: Option<Url>,
}

impl ResolutionState {
    pub fn new(url: &str) -> Self {
        Self {
            original_url: url.to_string(),
            current_url: url.to_string(),
            depth: 0,
            requests: 0,
            original_parsed: Url::parse(url).ok(),
        }
    }

    fn descend(&mut self, next: Url) {
        self.current_url = next.into();
        self.depth += 1;
    }

    fn is_original(&self, candidate: &Url) -> bool {
        match &self.original_parsed {
            Some(original) => original == candidate,
            None => candidate.as_str() == self.original_url,
        }
    }

    fn finish(&self, url: impl Into<String>, termination: Termination) -> Resolution {
        Resolution {
            url: url.into(),
            depth: self.depth,
            requests: self.requests,
            termination,
        }
    }
}

enum Step {
    Descend(Url),
    Done(Url, Termination),
}

/// Bounded, non-failing stream URL resolver.
#[derive(Clone)]
pub struct Resolver {
    fetcher: Arc<dyn PlaylistFetcher>,
    max_depth: u32,
}

impl Resolver {
    pub fn new(fetcher: Arc<dyn PlaylistFetcher>) -> Self {
        Self {
            fetcher,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build a resolver backed by [`HttpFetcher`].
    pub fn from_config(config: &ResolverConfig) -> AppResult<Self> {
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::new(Arc::new(fetcher)).with_max_depth(config.max_depth))
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Resolve and keep only the URL.
    pub async fn resolve_url(&self, url: &str) -> String {
        self.resolve(url).await.into_url()
    }

    /// Resolve `url` to its playable endpoint.
    pub async fn resolve(&self, url: &str) -> Resolution {
        if url.trim().is_empty() {
            return ResolutionState::new(url).finish(url, Termination::EmptyInput);
        }

        let mut state = ResolutionState::new(url);
        let resolution = loop {
            if state.depth > self.max_depth {
                break state.finish(state.current_url.clone(), Termination::DepthExceeded);
            }

            state.requests += 1;
            let resource = match self.fetcher.fetch(&state.current_url).await {
                Ok(resource) => resource,
                Err(err) => {
                    warn!(
                        target: "resolver",
                        url = %UrlUtils::obfuscate_credentials(&state.current_url),
                        depth = state.depth,
                        error = %err,
                        "fetch failed, keeping current URL"
                    );
                    break state.finish(state.current_url.clone(), Termination::Failed(err));
                }
            };

            let final_url = resource.final_url().clone();
            if !playlist::is_playlist_response(&final_url, resource.content_type()) {
                break state.finish(final_url, Termination::Leaf);
            }

            let body = match resource.text().await {
                Ok(body) => body,
                Err(err) => {
                    warn!(
                        target: "resolver",
                        url = %UrlUtils::obfuscate_credentials(final_url.as_str()),
                        error = %err,
                        "playlist body unreadable, keeping final URL"
                    );
                    break state.finish(final_url, Termination::Failed(err));
                }
            };

            if body.trim().is_empty() {
                break state.finish(final_url, Termination::EmptyPlaylist);
            }

            match self.next_step(&state, &final_url, &body) {
                Step::Descend(next) => {
                    debug!(
                        target: "resolver",
                        from = %UrlUtils::obfuscate_credentials(final_url.as_str()),
                        to = %UrlUtils::obfuscate_credentials(next.as_str()),
                        depth = state.depth + 1,
                        "following nested playlist"
                    );
                    state.descend(next);
                }
                Step::Done(url, termination) => break state.finish(url, termination),
            }
        };

        Self::record(&resolution);
        debug!(
            target: "resolver",
            original = %UrlUtils::obfuscate_credentials(url),
            resolved = %UrlUtils::obfuscate_credentials(&resolution.url),
            depth = resolution.depth,
            requests = resolution.requests,
            termination = resolution.termination.as_str(),
            "resolution complete"
        );
        resolution
    }

    /// Decide what the first usable reference of a playlist body means.
    fn next_step(&self, state: &ResolutionState, base: &Url, body: &str) -> Step {
        for line in playlist::reference_lines(body) {
            let reference = match UrlUtils::join(base, line) {
                Ok(reference) => reference,
                Err(err) => {
                    debug!(
                        target: "resolver",
                        line = %UrlUtils::obfuscate_credentials(line),
                        error = %err,
                        "skipping unparsable reference"
                    );
                    continue;
                }
            };

            if !UrlUtils::has_playlist_extension(&reference) {
                return Step::Done(reference, Termination::Reference);
            }
            if state.is_original(&reference) {
                return Step::Done(reference, Termination::CycleGuard);
            }
            return Step::Descend(reference);
        }

        Step::Done(base.clone(), Termination::NoReference)
    }

    fn record(resolution: &Resolution) {
        let m = metrics();
        m.resolution_total.add(
            1,
            &[KeyValue::new("termination", resolution.termination.as_str())],
        );
        m.resolution_requests_total
            .add(u64::from(resolution.requests), &[]);
    }
}
