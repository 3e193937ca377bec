//! TTL cache for validated fee schedules
//!
//! A schedule is parsed and validated once per source key and reused until
//! its TTL lapses or it is invalidated. A failed reload leaves any previous
//! entry in place.

use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use cierre_core::FeeSchedule;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, instrument};

/// Something that can produce a raw schedule document
pub trait ScheduleSource: Send + Sync {
    /// Cache key identifying this source
    fn key(&self) -> String;

    /// Fetch the raw JSON document
    fn fetch(&self) -> anyhow::Result<String>;
}

/// Reads the schedule from a local JSON file
#[derive(Debug, Clone)]
pub struct FileScheduleSource {
    path: PathBuf,
}

impl FileScheduleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScheduleSource for FileScheduleSource {
    fn key(&self) -> String {
        format!("file:{}", self.path.display())
    }

    fn fetch(&self) -> anyhow::Result<String> {
        std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read fee schedule '{}'", self.path.display()))
    }
}

/// A validated schedule with cache metadata
#[derive(Debug, Clone)]
pub struct CachedSchedule {
    pub schedule: Arc<FeeSchedule>,
    pub loaded_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub usage_count: u64,
}

impl CachedSchedule {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_loads: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / lookups as f64
        }
    }
}

/// Thread-safe schedule cache keyed by [`ScheduleSource::key`]
pub struct ScheduleCache {
    cache: DashMap<String, CachedSchedule>,
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    ttl: TimeDelta,
}

impl ScheduleCache {
    pub fn new(ttl_minutes: u64) -> Self {
        let ttl = i64::try_from(ttl_minutes)
            .ok()
            .and_then(TimeDelta::try_minutes)
            .unwrap_or(TimeDelta::MAX);
        Self {
            cache: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            loads: AtomicU64::new(0),
            ttl,
        }
    }

    /// Return the cached schedule for `source`, loading it on a miss
    #[instrument(skip_all, fields(source = %source.key()))]
    pub fn get_or_load(&self, source: &dyn ScheduleSource) -> anyhow::Result<Arc<FeeSchedule>> {
        let key = source.key();
        if let Some(mut entry) = self.cache.get_mut(&key) {
            if !entry.is_expired() {
                entry.usage_count += 1;
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(usage_count = entry.usage_count, "Schedule cache hit");
                return Ok(Arc::clone(&entry.schedule));
            }
            debug!("Schedule cache entry expired");
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        self.refresh(source)
    }

    /// Fetch and validate `source` unconditionally, replacing the entry
    #[instrument(skip_all, fields(source = %source.key()))]
    pub fn refresh(&self, source: &dyn ScheduleSource) -> anyhow::Result<Arc<FeeSchedule>> {
        let raw = source.fetch()?;
        let schedule =
            Arc::new(FeeSchedule::load(&raw).context("fee schedule failed validation")?);

        let loaded_at = Utc::now();
        let expires_at = loaded_at.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        let entry = CachedSchedule {
            schedule: Arc::clone(&schedule),
            loaded_at,
            expires_at,
            usage_count: 1,
        };
        self.cache.insert(source.key(), entry);
        self.loads.fetch_add(1, Ordering::Relaxed);

        info!(
            version = schedule.metadata().version.as_deref().unwrap_or("unversioned"),
            fees = schedule.definitions().len(),
            states = schedule.states().count(),
            %expires_at,
            "Fee schedule loaded"
        );
        Ok(schedule)
    }

    /// Drop the entry for `key`; returns whether one existed
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.cache.remove(key).is_some();
        if removed {
            info!(source = %key, "Schedule cache entry invalidated");
        }
        removed
    }

    pub fn entry(&self, key: &str) -> Option<CachedSchedule> {
        self.cache.get(key).map(|entry| entry.clone())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.cache.len(),
            cache_hits: self.hits.load(Ordering::Relaxed),
            cache_misses: self.misses.load(Ordering::Relaxed),
            total_loads: self.loads.load(Ordering::Relaxed),
        }
    }
}
