/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Resolver defaults
pub const DEFAULT_MAX_DEPTH: u32 = 4;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
/// Upper bound on playlist bytes read per resolution step (256 KiB)
pub const DEFAULT_MAX_PLAYLIST_BYTES: usize = 256 * 1024;

// Attacher defaults
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 250;
pub const DEFAULT_CONTAINER_ID: &str = "preview-modal";
pub const DEFAULT_CLIENT_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/hls.js@1";
pub const DEFAULT_HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

pub fn default_user_agent() -> String {
    format!("m3u-playback/{}", env!("CARGO_PKG_VERSION"))
}
