//! In-memory stand-ins for the player, DOM, script host, streaming client and network.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use m3u_playback::config::AttacherConfig;
use m3u_playback::errors::{
    AppError, AppResult, AttachError, AttachResult, PlayRejected, ResolveError, ResolveResult,
};
use m3u_playback::playback::{
    CanPlay, MediaContainer, MediaElement, MediaHost, PlaybackAttacher, Player, Playlist,
    ScriptHost, StreamingClientFactory, StreamingSession,
};
use m3u_playback::resolver::{FetchedResource, PlaylistFetcher, Resolver};

pub const CLIENT_SCRIPT: &str = "https://cdn.example/hls-client.js";

/* -----------------------------
 * Network
 * --------------------------- */

#[derive(Clone)]
pub struct Route {
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: String,
}

pub fn media(final_url: &str) -> Route {
    Route {
        final_url: final_url.to_string(),
        content_type: Some("audio/mpeg".to_string()),
        body: String::new(),
    }
}

pub fn manifest(final_url: &str, body: &str) -> Route {
    Route {
        final_url: final_url.to_string(),
        content_type: Some("application/vnd.apple.mpegurl".to_string()),
        body: body.to_string(),
    }
}

struct MapResource {
    final_url: Url,
    content_type: Option<String>,
    body: String,
}

#[async_trait]
impl FetchedResource for MapResource {
    fn final_url(&self) -> &Url {
        &self.final_url
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    async fn text(self: Box<Self>) -> ResolveResult<String> {
        Ok(self.body)
    }
}

#[derive(Default)]
pub struct MapFetcher {
    routes: HashMap<String, Route>,
    calls: AtomicU32,
}

impl MapFetcher {
    pub fn with(mut self, url: &str, route: Route) -> Self {
        self.routes.insert(url.to_string(), route);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaylistFetcher for MapFetcher {
    async fn fetch(&self, url: &str) -> ResolveResult<Box<dyn FetchedResource>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let route = self
            .routes
            .get(url)
            .cloned()
            .ok_or_else(|| ResolveError::request(url, "no route"))?;
        let final_url = Url::parse(&route.final_url)
            .map_err(|e| ResolveError::invalid_url(&route.final_url, e.to_string()))?;
        Ok(Box::new(MapResource {
            final_url,
            content_type: route.content_type,
            body: route.body,
        }))
    }
}

/* -----------------------------
 * DOM
 * --------------------------- */

#[derive(Default)]
pub struct ElementState {
    pub current_src: Option<String>,
    pub src_attribute: Option<String>,
    pub source_child_src: Option<String>,
    pub assigned: Vec<String>,
    pub play_calls: u32,
}

pub struct FakeAudio {
    pub state: Mutex<ElementState>,
    pub can_play: CanPlay,
    pub reject_play: bool,
}

impl FakeAudio {
    pub fn new(can_play: CanPlay) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ElementState::default()),
            can_play,
            reject_play: false,
        })
    }

    pub fn rejecting(can_play: CanPlay) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ElementState::default()),
            can_play,
            reject_play: true,
        })
    }

    /// What the external player does when it starts a track.
    pub fn load(&self, url: &str) {
        let mut state = self.state.lock().unwrap();
        state.current_src = Some(url.to_string());
        state.src_attribute = Some(url.to_string());
    }

    pub fn assigned(&self) -> Vec<String> {
        self.state.lock().unwrap().assigned.clone()
    }

    pub fn play_calls(&self) -> u32 {
        self.state.lock().unwrap().play_calls
    }
}

#[async_trait]
impl MediaElement for FakeAudio {
    fn current_src(&self) -> Option<String> {
        self.state.lock().unwrap().current_src.clone()
    }

    fn src_attribute(&self) -> Option<String> {
        self.state.lock().unwrap().src_attribute.clone()
    }

    fn source_child_src(&self) -> Option<String> {
        self.state.lock().unwrap().source_child_src.clone()
    }

    fn can_play_type(&self, _mime_type: &str) -> CanPlay {
        self.can_play
    }

    fn set_src(&self, url: &str) {
        let mut state = self.state.lock().unwrap();
        state.assigned.push(url.to_string());
        state.current_src = Some(url.to_string());
        state.src_attribute = Some(url.to_string());
    }

    async fn play(&self) -> Result<(), PlayRejected> {
        self.state.lock().unwrap().play_calls += 1;
        if self.reject_play {
            return Err(PlayRejected::new("autoplay blocked"));
        }
        Ok(())
    }
}

pub struct FakeContainer {
    pub audio: Option<Arc<FakeAudio>>,
}

impl MediaContainer for FakeContainer {
    fn preview_audio(&self) -> Option<Arc<dyn MediaElement>> {
        self.audio
            .clone()
            .map(|audio| audio as Arc<dyn MediaElement>)
    }
}

pub struct FakeHost {
    pub id: String,
    pub container: Option<Arc<FakeContainer>>,
}

impl FakeHost {
    pub fn with_audio(audio: Arc<FakeAudio>) -> Arc<Self> {
        Arc::new(Self {
            id: AttacherConfig::default().container_id,
            container: Some(Arc::new(FakeContainer { audio: Some(audio) })),
        })
    }

    pub fn empty_container() -> Arc<Self> {
        Arc::new(Self {
            id: AttacherConfig::default().container_id,
            container: Some(Arc::new(FakeContainer { audio: None })),
        })
    }

    pub fn closed() -> Arc<Self> {
        Arc::new(Self {
            id: AttacherConfig::default().container_id,
            container: None,
        })
    }
}

impl MediaHost for FakeHost {
    fn container(&self, id: &str) -> Option<Arc<dyn MediaContainer>> {
        if id != self.id {
            return None;
        }
        self.container
            .clone()
            .map(|container| container as Arc<dyn MediaContainer>)
    }
}

/* -----------------------------
 * Script host + streaming client
 * --------------------------- */

#[derive(Default)]
pub struct FakeScriptHost {
    pub loads: AtomicU32,
    pub fail: AtomicBool,
}

#[async_trait]
impl ScriptHost for FakeScriptHost {
    fn has_script(&self, _url: &str) -> bool {
        false
    }

    async fn load_script(&self, url: &str) -> AttachResult<()> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(AttachError::script_load(url, "blocked by CSP"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ClientCounters {
    pub created: AtomicU32,
    pub destroyed: AtomicU32,
    pub live: AtomicU32,
    pub loaded_sources: Mutex<Vec<String>>,
}

struct FakeSession {
    counters: Arc<ClientCounters>,
    bound: bool,
}

#[async_trait]
impl StreamingSession for FakeSession {
    async fn attach_media(&mut self, _media: Arc<dyn MediaElement>) -> AttachResult<()> {
        tokio::task::yield_now().await;
        self.bound = true;
        Ok(())
    }

    fn load_source(&mut self, url: &str) -> AttachResult<()> {
        if !self.bound {
            return Err(AttachError::LoadSource {
                url: url.to_string(),
                message: "media not attached".to_string(),
            });
        }
        self.counters
            .loaded_sources
            .lock()
            .unwrap()
            .push(url.to_string());
        Ok(())
    }

    fn destroy(&mut self) {
        self.counters.destroyed.fetch_add(1, Ordering::SeqCst);
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeClientFactory {
    pub counters: Arc<ClientCounters>,
}

impl StreamingClientFactory for FakeClientFactory {
    fn create(&self) -> AttachResult<Box<dyn StreamingSession>> {
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        self.counters.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            counters: self.counters.clone(),
            bound: false,
        }))
    }
}

/* -----------------------------
 * External player
 * --------------------------- */

/// Reads the playlist entry at call time and loads it into the element.
pub struct RecordingPlayer {
    pub playlist: Playlist,
    pub audio: Option<Arc<FakeAudio>>,
    pub calls: Mutex<Vec<(i64, Option<String>)>>,
    pub fail: bool,
}

impl RecordingPlayer {
    pub fn new(playlist: Playlist, audio: Option<Arc<FakeAudio>>) -> Arc<Self> {
        Arc::new(Self {
            playlist,
            audio,
            calls: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing(playlist: Playlist) -> Arc<Self> {
        Arc::new(Self {
            playlist,
            audio: None,
            calls: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn calls(&self) -> Vec<(i64, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Player for RecordingPlayer {
    async fn play(&self, index: i64) -> AppResult<()> {
        let entry = match usize::try_from(index) {
            Ok(i) => self.playlist.get(i).await,
            Err(_) => None,
        };
        self.calls.lock().unwrap().push((index, entry.clone()));
        if self.fail {
            return Err(AppError::player("decoder unavailable"));
        }
        if let (Some(audio), Some(url)) = (&self.audio, entry) {
            audio.load(&url);
        }
        Ok(())
    }
}

/* -----------------------------
 * Assembly
 * --------------------------- */

pub struct Harness {
    pub attacher: PlaybackAttacher,
    pub playlist: Playlist,
    pub player: Arc<RecordingPlayer>,
    pub fetcher: Arc<MapFetcher>,
    pub scripts: Arc<FakeScriptHost>,
    pub client: Arc<FakeClientFactory>,
}

pub fn attacher_config(settle_delay: Duration) -> AttacherConfig {
    AttacherConfig {
        settle_delay,
        client_script_url: CLIENT_SCRIPT.to_string(),
        ..AttacherConfig::default()
    }
}

pub fn harness(
    tracks: &[&str],
    fetcher: MapFetcher,
    host: Arc<FakeHost>,
    audio: Option<Arc<FakeAudio>>,
    settle_delay: Duration,
) -> Harness {
    let playlist = Playlist::new(tracks.iter().map(|t| t.to_string()).collect());
    let player = RecordingPlayer::new(playlist.clone(), audio);
    build(playlist, player, fetcher, host, settle_delay)
}

pub fn build(
    playlist: Playlist,
    player: Arc<RecordingPlayer>,
    fetcher: MapFetcher,
    host: Arc<FakeHost>,
    settle_delay: Duration,
) -> Harness {
    let fetcher = Arc::new(fetcher);
    let scripts = Arc::new(FakeScriptHost::default());
    let client = Arc::new(FakeClientFactory::default());

    let attacher = PlaybackAttacher::builder()
        .player(player.clone())
        .playlist(playlist.clone())
        .resolver(Resolver::new(fetcher.clone()))
        .media_host(host)
        .script_host(scripts.clone())
        .client_factory(client.clone())
        .config(attacher_config(settle_delay))
        .build()
        .expect("attacher builds");

    Harness {
        attacher,
        playlist,
        player,
        fetcher,
        scripts,
        client,
    }
}
