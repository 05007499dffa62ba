/*!
 * Playback Attacher
 * =================
 *
 * Decorates an existing `Player` so that selecting a track:
 *
 *   1. resolves the playlist entry (redirects, nested manifests) and writes the
 *      resolved URL back into the shared playlist;
 *   2. delegates to the wrapped player with the same index;
 *   3. after a short settle delay, inspects the preview audio element and, for
 *      HLS sources, attaches native playback or the loaded streaming client.
 *
 * Out-of-range indices skip steps 1 and 3 entirely. Nothing in steps 1 and 3
 * can fail the call: the wrapped player's result is returned unchanged.
 */

pub mod loader;
pub mod media;
pub mod playlist;
pub mod provider;
pub mod session;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::AttacherConfig;
use crate::errors::{AppError, AppResult};
use crate::metrics::{KeyValue, metrics};
use crate::resolver::Resolver;
use crate::utils::UrlUtils;

pub use loader::{ScriptHost, ScriptLoader};
pub use media::{CanPlay, MediaContainer, MediaElement, MediaHost, SourceKind};
pub use playlist::Playlist;
pub use provider::{AdaptiveProvider, ClientProvider, NativeProvider, ProviderKind};
pub use session::{SessionSlot, StreamingClientFactory, StreamingSession};

/// The playback capability being wrapped: start track `index` of the playlist.
#[async_trait]
pub trait Player: Send + Sync {
    async fn play(&self, index: i64) -> AppResult<()>;
}

/// Result of one attachment pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    NoContainer,
    NoElement,
    NoSource,
    NotHls,
    Native,
    Client,
    Failed(String),
}

impl AttachOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachOutcome::NoContainer => "no-container",
            AttachOutcome::NoElement => "no-element",
            AttachOutcome::NoSource => "no-source",
            AttachOutcome::NotHls => "not-hls",
            AttachOutcome::Native => "native",
            AttachOutcome::Client => "client",
            AttachOutcome::Failed(_) => "failed",
        }
    }
}

struct AttacherInner {
    player: Arc<dyn Player>,
    playlist: Playlist,
    resolver: Resolver,
    host: Arc<dyn MediaHost>,
    native: NativeProvider,
    client: ClientProvider,
    config: AttacherConfig,
}

impl AttacherInner {
    async fn attach(&self) -> AttachOutcome {
        let outcome = self.attach_inner().await;
        metrics()
            .attach_total
            .add(1, &[KeyValue::new("outcome", outcome.as_str())]);
        outcome
    }

    async fn attach_inner(&self) -> AttachOutcome {
        let Some(container) = self.host.container(&self.config.container_id) else {
            debug!(target: "playback", container = %self.config.container_id, "no player container, skipping attach");
            return AttachOutcome::NoContainer;
        };
        let Some(element) = container.preview_audio() else {
            debug!(target: "playback", "no preview audio element, skipping attach");
            return AttachOutcome::NoElement;
        };
        let Some(source) = media::current_source(element.as_ref()) else {
            debug!(target: "playback", "media element has no source, skipping attach");
            return AttachOutcome::NoSource;
        };
        if SourceKind::classify(&source) != SourceKind::Hls {
            return AttachOutcome::NotHls;
        }

        let provider: &dyn AdaptiveProvider =
            if element.can_play_type(&self.config.hls_mime_type).is_supported() {
                &self.native
            } else {
                &self.client
            };

        match provider.attach(element, &source).await {
            Ok(()) => match provider.kind() {
                ProviderKind::Native => AttachOutcome::Native,
                ProviderKind::Client => AttachOutcome::Client,
            },
            Err(err) => {
                warn!(
                    target: "playback",
                    provider = provider.kind().as_str(),
                    source = %UrlUtils::obfuscate_credentials(&source),
                    error = %err,
                    "HLS attach failed"
                );
                AttachOutcome::Failed(err.to_string())
            }
        }
    }
}

/// `Player` decorator adding resolution and HLS attachment.
pub struct PlaybackAttacher {
    inner: Arc<AttacherInner>,
    pending: Mutex<Option<JoinHandle<AttachOutcome>>>,
}

impl PlaybackAttacher {
    pub fn builder() -> PlaybackAttacherBuilder {
        PlaybackAttacherBuilder::default()
    }

    pub fn playlist(&self) -> &Playlist {
        &self.inner.playlist
    }

    /// Run the attachment pass now, without the settle delay.
    pub async fn attach_now(&self) -> AttachOutcome {
        self.inner.attach().await
    }

    /// Wait for the most recently scheduled attachment pass.
    pub async fn settle(&self) -> Option<AttachOutcome> {
        let handle = self.pending.lock().await.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                warn!(target: "playback", error = %err, "attachment task did not complete");
                None
            }
        }
    }

    /// Number of live streaming sessions (0 or 1).
    pub async fn live_session_count(&self) -> usize {
        usize::from(self.inner.client.has_live_session().await)
    }

    /// Destroy the live streaming session, if any.
    pub async fn release_session(&self) -> bool {
        self.inner.client.release().await
    }

    async fn schedule_attach(&self) {
        let inner = self.inner.clone();
        let delay = inner.config.settle_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.attach().await
        });
        // An earlier pass still pending keeps running detached.
        *self.pending.lock().await = Some(handle);
    }

    async fn resolve_entry(&self, index: usize) {
        let playlist = &self.inner.playlist;
        let Some(original) = playlist.get(index).await else {
            return;
        };

        let resolution = self.inner.resolver.resolve(&original).await;
        if resolution.url != original {
            info!(
                target: "playback",
                index,
                original = %UrlUtils::obfuscate_credentials(&original),
                resolved = %UrlUtils::obfuscate_credentials(&resolution.url),
                termination = resolution.termination.as_str(),
                "rewriting playlist entry"
            );
            playlist.set(index, resolution.url).await;
        }
    }
}

#[async_trait]
impl Player for PlaybackAttacher {
    async fn play(&self, index: i64) -> AppResult<()> {
        let Some(slot) = self.inner.playlist.checked_index(index).await else {
            debug!(target: "playback", index, "index outside playlist, delegating unchanged");
            return self.inner.player.play(index).await;
        };

        self.resolve_entry(slot).await;
        self.inner.player.play(index).await?;
        self.schedule_attach().await;
        Ok(())
    }
}

/// Builder for [`PlaybackAttacher`].
#[derive(Default)]
pub struct PlaybackAttacherBuilder {
    player: Option<Arc<dyn Player>>,
    playlist: Option<Playlist>,
    resolver: Option<Resolver>,
    host: Option<Arc<dyn MediaHost>>,
    script_host: Option<Arc<dyn ScriptHost>>,
    client_factory: Option<Arc<dyn StreamingClientFactory>>,
    config: AttacherConfig,
}

impl PlaybackAttacherBuilder {
    pub fn player(mut self, player: Arc<dyn Player>) -> Self {
        self.player = Some(player);
        self
    }

    pub fn playlist(mut self, playlist: Playlist) -> Self {
        self.playlist = Some(playlist);
        self
    }

    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn media_host(mut self, host: Arc<dyn MediaHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn script_host(mut self, script_host: Arc<dyn ScriptHost>) -> Self {
        self.script_host = Some(script_host);
        self
    }

    pub fn client_factory(mut self, factory: Arc<dyn StreamingClientFactory>) -> Self {
        self.client_factory = Some(factory);
        self
    }

    pub fn config(mut self, config: AttacherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> AppResult<PlaybackAttacher> {
        fn required<T>(value: Option<T>, name: &str) -> AppResult<T> {
            value.ok_or_else(|| AppError::configuration(format!("PlaybackAttacher requires {name}")))
        }

        let client = ClientProvider::new(
            required(self.script_host, "a script host")?,
            required(self.client_factory, "a streaming client factory")?,
            self.config.client_script_url.clone(),
        );

        let inner = AttacherInner {
            player: required(self.player, "a player")?,
            playlist: self.playlist.unwrap_or_default(),
            resolver: required(self.resolver, "a resolver")?,
            host: required(self.host, "a media host")?,
            native: NativeProvider,
            client,
            config: self.config,
        };

        Ok(PlaybackAttacher {
            inner: Arc::new(inner),
            pending: Mutex::new(None),
        })
    }
}
