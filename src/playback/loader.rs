use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

use crate::errors::AttachResult;
use crate::utils::UrlUtils;

/// Environment able to load an external client script.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// True when a script for `url` is already present and loaded
    fn has_script(&self, url: &str) -> bool;

    /// Fetch and evaluate the script at `url`
    async fn load_script(&self, url: &str) -> AttachResult<()>;
}

/// Loads each script URL at most once per loader lifetime.
///
/// Concurrent callers for the same URL share one in-flight load. A failed load
/// is not remembered, so a later call tries again.
pub struct ScriptLoader {
    host: Arc<dyn ScriptHost>,
    loads: Mutex<HashMap<String, Arc<OnceCell<()>>>>,
}

impl ScriptLoader {
    pub fn new(host: Arc<dyn ScriptHost>) -> Self {
        Self {
            host,
            loads: Mutex::new(HashMap::new()),
        }
    }

    pub async fn ensure_loaded(&self, url: &str) -> AttachResult<()> {
        if self.host.has_script(url) {
            debug!(target: "playback", url = %UrlUtils::obfuscate_credentials(url), "script already present");
            return Ok(());
        }

        let cell = {
            let mut loads = self.loads.lock().await;
            loads.entry(url.to_string()).or_default().clone()
        };

        cell.get_or_try_init(|| async {
            info!(target: "playback", url = %UrlUtils::obfuscate_credentials(url), "loading streaming client script");
            self.host.load_script(url).await
        })
        .await
        .map(|_| ())
    }
}
