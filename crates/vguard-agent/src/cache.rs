//! Keyframe cache.
//!
//! Memoizes keyframe extraction per (video identity, count). The cache is
//! an injectable value with an explicit lifecycle: created alongside the
//! evaluator, torn down with it. Concurrent reads are cheap; concurrent
//! misses for the same key may extract redundantly, in which case the last
//! write wins. Failed extractions are never cached, so later calls retry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

use vguard_media::{FrameSource, MediaResult};
use vguard_models::{FrameRef, VideoId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    video: VideoId,
    count: usize,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    frames: Arc<Vec<FrameRef>>,
    cached_at: Instant,
}

/// Cache statistics snapshot.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
    /// Advisory expiry from configuration; callers decide whether to honor it
    pub advisory_expiry: Duration,
    /// Age of the oldest entry, if any
    pub oldest_entry_age: Option<Duration>,
}

/// Memoized keyframe extraction results.
pub struct KeyframeCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    advisory_expiry: Duration,
}

impl KeyframeCache {
    pub fn new(advisory_expiry: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            advisory_expiry,
        }
    }

    /// Look up cached frames without extracting.
    pub async fn get(&self, video: &VideoId, count: usize) -> Option<Arc<Vec<FrameRef>>> {
        let key = CacheKey {
            video: video.clone(),
            count,
        };
        let entries = self.entries.read().await;
        entries.get(&key).map(|e| Arc::clone(&e.frames))
    }

    /// Store pre-extracted frames for a key, replacing any prior entry.
    pub async fn insert(
        &self,
        video: &VideoId,
        count: usize,
        frames: Vec<FrameRef>,
    ) -> Arc<Vec<FrameRef>> {
        let frames = Arc::new(frames);
        let key = CacheKey {
            video: video.clone(),
            count,
        };
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                frames: Arc::clone(&frames),
                cached_at: Instant::now(),
            },
        );
        frames
    }

    /// Get cached frames, extracting through `source` on a miss.
    ///
    /// Extraction failures propagate to the caller and leave the cache
    /// untouched.
    pub async fn get_or_extract(
        &self,
        source: &dyn FrameSource,
        video: &VideoId,
        count: usize,
    ) -> MediaResult<Arc<Vec<FrameRef>>> {
        if let Some(frames) = self.get(video, count).await {
            debug!(video = %video, count = count, "Keyframe cache HIT");
            return Ok(frames);
        }

        debug!(video = %video, count = count, "Keyframe cache MISS");
        let frames = source.extract_keyframes(video, count).await?;
        let frames = self.insert(video, count, frames).await;
        info!(
            video = %video,
            count = count,
            frames = frames.len(),
            "Keyframe cache stored"
        );
        Ok(frames)
    }

    /// Drop every entry for a video identity, across all counts.
    pub async fn invalidate(&self, video: &VideoId) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| &key.video != video);
        debug!(
            video = %video,
            removed = before - entries.len(),
            "Keyframe cache invalidated"
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let oldest_entry_age = entries.values().map(|e| e.cached_at.elapsed()).max();
        CacheStats {
            entries: entries.len(),
            advisory_expiry: self.advisory_expiry,
            oldest_entry_age,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vguard_media::{MediaError, MediaResult};
    use vguard_models::VideoInfo;

    /// Frame source that counts extractions and can fail the first N calls.
    struct CountingSource {
        extractions: AtomicUsize,
        failures_remaining: AtomicUsize,
    }

    impl CountingSource {
        fn new(failures: usize) -> Self {
            Self {
                extractions: AtomicUsize::new(0),
                failures_remaining: AtomicUsize::new(failures),
            }
        }
    }

    #[async_trait]
    impl FrameSource for CountingSource {
        async fn extract_keyframes(
            &self,
            video: &VideoId,
            count: usize,
        ) -> MediaResult<Vec<FrameRef>> {
            let n = self.extractions.fetch_add(1, Ordering::SeqCst);
            if self
                .failures_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |f| f.checked_sub(1))
                .is_ok()
            {
                return Err(MediaError::InvalidVideo("transient".to_string()));
            }
            Ok((0..count)
                .map(|i| FrameRef::new(format!("{}/kf_{}_{}.jpg", video, n, i)))
                .collect())
        }

        async fn video_info(&self, _video: &VideoId) -> MediaResult<VideoInfo> {
            Ok(VideoInfo {
                width: 1920,
                height: 1080,
                fps: 30.0,
                duration: 5.0,
            })
        }
    }

    #[tokio::test]
    async fn test_get_is_idempotent() {
        let cache = KeyframeCache::new(Duration::from_secs(3600));
        let source = CountingSource::new(0);
        let video = VideoId::from("/videos/scene_1.mp4");

        let first = cache.get_or_extract(&source, &video, 2).await.unwrap();
        let second = cache.get_or_extract(&source, &video, 2).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.extractions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_extraction_is_not_cached() {
        let cache = KeyframeCache::new(Duration::from_secs(3600));
        let source = CountingSource::new(1);
        let video = VideoId::from("/videos/scene_1.mp4");

        assert!(cache.get_or_extract(&source, &video, 2).await.is_err());
        assert!(cache.is_empty().await);

        // Retry succeeds and caches.
        let frames = cache.get_or_extract(&source, &video, 2).await.unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalidate_drops_all_counts_for_video() {
        let cache = KeyframeCache::new(Duration::from_secs(3600));
        let source = CountingSource::new(0);
        let video_a = VideoId::from("/videos/a.mp4");
        let video_b = VideoId::from("/videos/b.mp4");

        cache.get_or_extract(&source, &video_a, 1).await.unwrap();
        cache.get_or_extract(&source, &video_a, 2).await.unwrap();
        cache.get_or_extract(&source, &video_b, 2).await.unwrap();
        assert_eq!(cache.len().await, 3);

        cache.invalidate(&video_a).await;
        assert_eq!(cache.len().await, 1);
        assert!(cache.get(&video_a, 1).await.is_none());
        assert!(cache.get(&video_a, 2).await.is_none());
        assert!(cache.get(&video_b, 2).await.is_some());
    }

    #[tokio::test]
    async fn test_stats_report_advisory_expiry() {
        let cache = KeyframeCache::new(Duration::from_secs(60));
        let stats = cache.stats().await;
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.advisory_expiry, Duration::from_secs(60));
        assert!(stats.oldest_entry_age.is_none());
    }
}
