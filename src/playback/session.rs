//! Single-instance lifecycle for the adaptive-streaming client.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::media::MediaElement;
use crate::errors::{AttachError, AttachResult};
use crate::metrics::metrics;

/// One instance of the loaded adaptive-streaming engine.
#[async_trait]
pub trait StreamingSession: Send + Sync {
    /// Bind to a media element. Returns once binding has completed.
    async fn attach_media(&mut self, media: Arc<dyn MediaElement>) -> AttachResult<()>;

    /// Start loading a manifest into the bound element.
    fn load_source(&mut self, url: &str) -> AttachResult<()>;

    /// Release the engine and everything bound to it.
    fn destroy(&mut self);
}

/// Constructor exposed by the loaded client library.
pub trait StreamingClientFactory: Send + Sync {
    /// Whether the host provides what the client needs (MSE and friends).
    fn is_supported(&self) -> bool {
        true
    }

    fn create(&self) -> AttachResult<Box<dyn StreamingSession>>;
}

/// Holds the only live streaming session.
///
/// The lock is held from destroying the previous session until the new one
/// is stored, so two sessions are never bound at the same time.
#[derive(Default)]
pub struct SessionSlot {
    live: Mutex<Option<Box<dyn StreamingSession>>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroy the current session (if any), then create, bind and load a new one.
    pub async fn replace(
        &self,
        factory: &dyn StreamingClientFactory,
        media: Arc<dyn MediaElement>,
        source: &str,
    ) -> AttachResult<()> {
        let mut live = self.live.lock().await;

        if let Some(mut previous) = live.take() {
            debug!(target: "playback", "destroying previous streaming session");
            previous.destroy();
            metrics().session_destroyed_total.add(1, &[]);
        }

        if !factory.is_supported() {
            return Err(AttachError::session_create(
                "streaming client is not supported on this host",
            ));
        }
        let mut session = factory.create()?;

        let bound = match session.attach_media(media).await {
            Ok(()) => session.load_source(source),
            Err(err) => Err(err),
        };
        if let Err(err) = bound {
            warn!(target: "playback", error = %err, "streaming session setup failed, releasing it");
            session.destroy();
            return Err(err);
        }

        *live = Some(session);
        Ok(())
    }

    pub async fn is_live(&self) -> bool {
        self.live.lock().await.is_some()
    }

    /// Destroy the live session, if any.
    pub async fn release(&self) -> bool {
        match self.live.lock().await.take() {
            Some(mut session) => {
                session.destroy();
                metrics().session_destroyed_total.add(1, &[]);
                true
            }
            None => false,
        }
    }
}
