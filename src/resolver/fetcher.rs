//! Network seam for the resolver.

use async_trait::async_trait;
use url::Url;

use crate::errors::ResolveResult;

/// A response whose headers have arrived but whose body has not been read.
///
/// The body is only pulled for responses that look like playlists, so a leaf
/// media URL costs one request and no body transfer.
#[async_trait]
pub trait FetchedResource: Send {
    /// URL after all transport-level redirects
    fn final_url(&self) -> &Url;

    /// Declared `Content-Type`, if any
    fn content_type(&self) -> Option<&str>;

    /// Read the body as text
    async fn text(self: Box<Self>) -> ResolveResult<String>;
}

/// Performs one resolution request: GET, redirects followed, caching disabled.
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ResolveResult<Box<dyn FetchedResource>>;
}
