//! Rate Limiting Infrastructure
//!
//! Sliding-window admission control with two independent keyspaces: one
//! keyed by request source (client address) and one keyed by resolved
//! identity (account). Both must admit a request for it to proceed.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::task::PeriodicTask;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum accepted requests per key inside one window
    pub max_requests: u32,
    /// Rolling window length
    pub window: Duration,
    /// Keys not seen for longer than this are evicted
    pub idle_retention: Duration,
    /// How often the eviction pass runs
    pub eviction_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
            idle_retention: Duration::from_secs(60 * 60),
            eviction_interval: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            ..Self::default()
        }
    }

    pub fn window_ms(&self) -> i64 {
        duration_ms(self.window)
    }

    pub fn idle_retention_ms(&self) -> i64 {
        duration_ms(self.idle_retention)
    }
}

fn duration_ms(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    /// When the oldest counted request leaves the window (epoch ms)
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Time until a slot frees up, measured from `now_ms`.
    pub fn retry_after(&self, now_ms: i64) -> Duration {
        let ms = (self.reset_at_ms - now_ms).max(0);
        Duration::from_millis(u64::try_from(ms).unwrap_or(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyspace {
    Source,
    Identity,
}

impl fmt::Display for Keyspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyspace::Source => f.write_str("source"),
            Keyspace::Identity => f.write_str("identity"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("rate limit exceeded for {keyspace} key")]
    Exceeded {
        keyspace: Keyspace,
        retry_after: Duration,
    },

    #[error("rate limit store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count one request against `key` if there is room in the window.
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

// ============================================================================
// Sliding window keyspace
// ============================================================================

#[derive(Debug, Default)]
struct WindowEntry {
    /// Accepted request timestamps (epoch ms), oldest first
    hits: VecDeque<i64>,
    /// Last time this key was seen, accepted or not
    last_seen_ms: i64,
}

/// One keyspace of sliding-window counters behind a single mutex.
#[derive(Debug)]
pub struct SlidingWindow {
    entries: Mutex<HashMap<String, WindowEntry>>,
    clock: Arc<dyn Clock>,
}

impl SlidingWindow {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Drop keys idle for longer than `retention`. Returns how many went.
    pub async fn evict_idle(&self, retention: Duration) -> usize {
        let cutoff = self.clock.now_ms().saturating_sub(duration_ms(retention));
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.last_seen_ms >= cutoff);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl RateLimitStore for SlidingWindow {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        let now = self.clock.now_ms();
        let window = config.window_ms();

        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key.to_owned()).or_default();

        while entry.hits.front().is_some_and(|&t| now - t >= window) {
            entry.hits.pop_front();
        }
        entry.last_seen_ms = now;

        let count = u32::try_from(entry.hits.len()).unwrap_or(u32::MAX);
        if count >= config.max_requests {
            let reset_at_ms = entry.hits.front().map_or(now, |&oldest| oldest + window);
            return Ok(RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_at_ms,
            });
        }

        entry.hits.push_back(now);
        let reset_at_ms = entry.hits.front().map_or(now, |&oldest| oldest) + window;
        Ok(RateLimitResult {
            allowed: true,
            remaining: config.max_requests - count - 1,
            reset_at_ms,
        })
    }
}

// ============================================================================
// Dual-keyspace limiter
// ============================================================================

/// Gate in front of every credential operation.
///
/// Owns its eviction task: dropping the limiter stops the task, and
/// [`RateLimiter::shutdown`] stops it and waits.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    source: Arc<SlidingWindow>,
    identity: Arc<SlidingWindow>,
    clock: Arc<dyn Clock>,
    eviction: Mutex<Option<PeriodicTask>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            source: Arc::new(SlidingWindow::new(Arc::clone(&clock))),
            identity: Arc::new(SlidingWindow::new(Arc::clone(&clock))),
            clock,
            eviction: Mutex::new(None),
        }
    }

    /// Start the background idle-eviction pass.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_eviction(self) -> Self {
        let source = Arc::clone(&self.source);
        let identity = Arc::clone(&self.identity);
        let retention = self.config.idle_retention;

        let task = PeriodicTask::spawn(
            "rate_limit_eviction",
            self.config.eviction_interval,
            move || {
                let source = Arc::clone(&source);
                let identity = Arc::clone(&identity);
                async move {
                    let evicted =
                        source.evict_idle(retention).await + identity.evict_idle(retention).await;
                    if evicted > 0 {
                        tracing::debug!(evicted, "evicted idle rate limit keys");
                    }
                }
            },
        );

        Self {
            eviction: Mutex::new(Some(task)),
            ..self
        }
    }

    /// Check the source keyspace, then the identity keyspace if given.
    ///
    /// The identity keyspace is not touched when the source rejects.
    pub async fn check(&self, source: &str, identity: Option<&str>) -> Result<(), RateLimitError> {
        self.check_keyspace(Keyspace::Source, &self.source, source)
            .await?;
        if let Some(identity) = identity {
            self.check_keyspace(Keyspace::Identity, &self.identity, identity)
                .await?;
        }
        Ok(())
    }

    /// Boolean form of [`RateLimiter::check`].
    pub async fn allow(&self, source: &str, identity: Option<&str>) -> bool {
        self.check(source, identity).await.is_ok()
    }

    async fn check_keyspace(
        &self,
        keyspace: Keyspace,
        store: &SlidingWindow,
        key: &str,
    ) -> Result<(), RateLimitError> {
        let result = RateLimitStore::check_and_increment(store, key, &self.config).await?;
        if result.allowed {
            return Ok(());
        }

        let retry_after = result.retry_after(self.clock.now_ms());
        tracing::warn!(
            %keyspace,
            key,
            retry_after_ms = retry_after.as_millis() as u64,
            "rate limit exceeded"
        );
        Err(RateLimitError::Exceeded {
            keyspace,
            retry_after,
        })
    }

    /// Evict idle keys from both keyspaces now.
    pub async fn evict_idle(&self) -> usize {
        let retention = self.config.idle_retention;
        self.source.evict_idle(retention).await + self.identity.evict_idle(retention).await
    }

    /// Number of tracked keys (source, identity).
    pub async fn tracked_keys(&self) -> (usize, usize) {
        (self.source.len().await, self.identity.len().await)
    }

    /// Stop the eviction task, if running, and wait for it.
    pub async fn shutdown(&self) {
        let task = self.eviction.lock().await.take();
        if let Some(task) = task {
            task.stop().await;
        }
    }
}
