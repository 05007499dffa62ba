use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared, ordered list of track URLs.
///
/// Cloning yields another handle to the same list. The external player reads
/// it; the attacher rewrites single entries after resolution.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: Arc<RwLock<Vec<String>>>,
}

impl Playlist {
    pub fn new(tracks: Vec<String>) -> Self {
        Self {
            tracks: Arc::new(RwLock::new(tracks)),
        }
    }

    pub async fn len(&self) -> usize {
        self.tracks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tracks.read().await.is_empty()
    }

    pub async fn get(&self, index: usize) -> Option<String> {
        self.tracks.read().await.get(index).cloned()
    }

    /// Overwrite one entry. Returns false when `index` is out of range.
    pub async fn set(&self, index: usize, url: String) -> bool {
        match self.tracks.write().await.get_mut(index) {
            Some(slot) => {
                *slot = url;
                true
            }
            None => false,
        }
    }

    pub async fn snapshot(&self) -> Vec<String> {
        self.tracks.read().await.clone()
    }

    /// Map a caller-supplied index onto `[0, len)`.
    pub async fn checked_index(&self, index: i64) -> Option<usize> {
        let index = usize::try_from(index).ok()?;
        (index < self.len().await).then_some(index)
    }
}

impl FromIterator<String> for Playlist {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
