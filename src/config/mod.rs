use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use defaults::*;
use crate::errors::{AppError, AppResult};

/// Settings for the stream resolver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum nested manifest steps before resolution is forced to stop
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    /// Total timeout for a single resolution request
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,
    /// Transport-level redirects followed per request
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Playlist bodies are truncated beyond this many bytes
    #[serde(default = "default_max_playlist_bytes")]
    pub max_playlist_bytes: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Settings for the playback attacher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttacherConfig {
    /// Delay before the attachment pass inspects the media element
    #[serde(default = "default_settle_delay", with = "duration_serde")]
    pub settle_delay: Duration,
    /// Identifier of the container holding the preview audio element
    #[serde(default = "default_container_id")]
    pub container_id: String,
    /// Location of the adaptive-streaming client library
    #[serde(default = "default_client_script_url")]
    pub client_script_url: String,
    /// MIME type probed for native HLS support
    #[serde(default = "default_hls_mime_type")]
    pub hls_mime_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub attacher: AttacherConfig,
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

fn default_max_playlist_bytes() -> usize {
    DEFAULT_MAX_PLAYLIST_BYTES
}

fn default_settle_delay() -> Duration {
    Duration::from_millis(DEFAULT_SETTLE_DELAY_MS)
}

fn default_container_id() -> String {
    DEFAULT_CONTAINER_ID.to_string()
}

fn default_client_script_url() -> String {
    DEFAULT_CLIENT_SCRIPT_URL.to_string()
}

fn default_hls_mime_type() -> String {
    DEFAULT_HLS_MIME_TYPE.to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            max_redirects: default_max_redirects(),
            max_playlist_bytes: default_max_playlist_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for AttacherConfig {
    fn default() -> Self {
        Self {
            settle_delay: default_settle_delay(),
            container_id: default_container_id(),
            client_script_url: default_client_script_url(),
            hls_mime_type: default_hls_mime_type(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, writing the defaults out when the
    /// file does not exist yet.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.resolver.max_playlist_bytes == 0 {
            return Err(AppError::configuration(
                "resolver.max_playlist_bytes must be greater than 0",
            ));
        }
        if self.attacher.container_id.trim().is_empty() {
            return Err(AppError::configuration(
                "attacher.container_id must not be empty",
            ));
        }
        Ok(())
    }
}
