//! Playback strategies for HLS sources.
//!
//! `NativeProvider` hands the URL straight to an element that can decode HLS
//! itself. `ClientProvider` loads the adaptive-streaming client on demand and
//! drives it through the single-session slot.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::loader::{ScriptHost, ScriptLoader};
use super::media::MediaElement;
use super::session::{SessionSlot, StreamingClientFactory};
use crate::errors::AttachResult;
use crate::utils::UrlUtils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Native,
    Client,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Native => "native",
            ProviderKind::Client => "client",
        }
    }
}

#[async_trait]
pub trait AdaptiveProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn attach(&self, media: Arc<dyn MediaElement>, source: &str) -> AttachResult<()>;
}

/// Native decoding: assign the source and start playback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeProvider;

#[async_trait]
impl AdaptiveProvider for NativeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Native
    }

    async fn attach(&self, media: Arc<dyn MediaElement>, source: &str) -> AttachResult<()> {
        media.set_src(source);
        if let Err(rejected) = media.play().await {
            debug!(target: "playback", reason = %rejected.reason, "native play() rejected, ignoring");
        }
        Ok(())
    }
}

/// Dynamically loaded adaptive-streaming client.
pub struct ClientProvider {
    loader: ScriptLoader,
    script_url: String,
    factory: Arc<dyn StreamingClientFactory>,
    slot: SessionSlot,
}

impl ClientProvider {
    pub fn new(
        script_host: Arc<dyn ScriptHost>,
        factory: Arc<dyn StreamingClientFactory>,
        script_url: impl Into<String>,
    ) -> Self {
        Self {
            loader: ScriptLoader::new(script_host),
            script_url: script_url.into(),
            factory,
            slot: SessionSlot::new(),
        }
    }

    pub async fn has_live_session(&self) -> bool {
        self.slot.is_live().await
    }

    pub async fn release(&self) -> bool {
        self.slot.release().await
    }
}

#[async_trait]
impl AdaptiveProvider for ClientProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Client
    }

    async fn attach(&self, media: Arc<dyn MediaElement>, source: &str) -> AttachResult<()> {
        self.loader.ensure_loaded(&self.script_url).await?;
        self.slot.replace(self.factory.as_ref(), media, source).await?;
        info!(
            target: "playback",
            source = %UrlUtils::obfuscate_credentials(source),
            "streaming client attached"
        );
        Ok(())
    }
}
