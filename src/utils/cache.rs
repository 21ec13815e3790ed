//! Local caching for API responses.
//!
//! Both expensive remote operations are memoized here for a bounded time
//! window: the full page-aggregation result per author, and the abstract
//! detail per EID. Expired entries are recomputed transparently on the
//! next call.
//!
//! # Cache Structure
//!
//! ```text
//! ~/.cache/scopus-scout/
//!   searches/
//!     <hash>      (JSON: metadata + SearchOutcome)
//!   abstracts/
//!     <hash>      (JSON: metadata + AbstractDetail)
//! ```

use crate::config::{default_cache_dir, CacheConfig};
use crate::models::{SearchOutcome, SearchQuery};
use crate::scopus::AbstractDetail;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Cache metadata stored with each cached item
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheMetadata {
    /// When the item was cached (Unix timestamp)
    cached_at: u64,

    /// When the item expires (Unix timestamp)
    expires_at: u64,

    /// The input the cached operation ran with
    input: String,
}

/// Wrapper pairing a cached payload with its metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedEntry<T> {
    metadata: CacheMetadata,
    payload: T,
}

/// Result of a cache lookup
pub enum CacheResult<T> {
    /// Item was found and is valid
    Hit(T),

    /// Item was not found
    Miss,

    /// Item was found but has expired
    Expired,
}

/// Cache service for storing and retrieving cached API responses
#[derive(Debug, Clone)]
pub struct CacheService {
    /// Base cache directory
    base_dir: PathBuf,

    /// Search outcome cache directory
    search_dir: PathBuf,

    /// Abstract detail cache directory
    abstract_dir: PathBuf,

    /// Configuration
    config: CacheConfig,
}

impl CacheService {
    /// Create a cache service with default config
    pub fn new() -> Self {
        Self::from_config(CacheConfig::default())
    }

    /// Create a cache service with the given config
    pub fn from_config(config: CacheConfig) -> Self {
        let base_dir = config.directory.clone().unwrap_or_else(default_cache_dir);

        let search_dir = base_dir.join("searches");
        let abstract_dir = base_dir.join("abstracts");

        Self {
            base_dir,
            search_dir,
            abstract_dir,
            config,
        }
    }

    /// Initialize the cache directories
    pub fn initialize(&self) -> std::io::Result<()> {
        if self.config.enabled {
            fs::create_dir_all(&self.search_dir)?;
            fs::create_dir_all(&self.abstract_dir)?;
            tracing::debug!("cache initialized at {}", self.base_dir.display());
        } else {
            tracing::debug!("cache is disabled");
        }
        Ok(())
    }

    /// Check if caching is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Get the cache directory
    pub fn cache_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Cache key for a full author search
    fn search_cache_key(&self, query: &SearchQuery) -> String {
        let input = format!("search|{}|{}", query.author_id, query.page_size);
        format!("{:x}", md5::compute(input.as_bytes()))
    }

    /// Cache key for one abstract lookup
    fn abstract_cache_key(&self, eid: &str) -> String {
        let input = format!("abstract|{}", eid);
        format!("{:x}", md5::compute(input.as_bytes()))
    }

    /// Check if a cache entry is expired
    fn is_expired(&self, expires_at: u64) -> bool {
        now_unix() >= expires_at
    }

    /// Read a cached search outcome
    pub fn get_search(&self, query: &SearchQuery) -> CacheResult<SearchOutcome> {
        if !self.is_enabled() {
            return CacheResult::Miss;
        }

        let key = self.search_cache_key(query);
        self.lookup(&self.search_dir.join(&key), "search", &key)
    }

    /// Cache a search outcome
    pub fn set_search(&self, query: &SearchQuery, outcome: &SearchOutcome) {
        if !self.is_enabled() {
            return;
        }

        let key = self.search_cache_key(query);
        self.store(
            &self.search_dir.join(&key),
            &query.author_id,
            self.config.search_ttl_seconds,
            outcome,
        );
    }

    /// Read a cached abstract detail
    pub fn get_abstract(&self, eid: &str) -> CacheResult<AbstractDetail> {
        if !self.is_enabled() {
            return CacheResult::Miss;
        }

        let key = self.abstract_cache_key(eid);
        self.lookup(&self.abstract_dir.join(&key), "abstract", &key)
    }

    /// Cache an abstract detail
    pub fn set_abstract(&self, eid: &str, detail: &AbstractDetail) {
        if !self.is_enabled() {
            return;
        }

        let key = self.abstract_cache_key(eid);
        self.store(
            &self.abstract_dir.join(&key),
            eid,
            self.config.abstract_ttl_seconds,
            detail,
        );
    }

    fn lookup<T: for<'de> Deserialize<'de>>(
        &self,
        path: &Path,
        kind: &str,
        key: &str,
    ) -> CacheResult<T> {
        match self.read_cache_file::<CachedEntry<T>>(path) {
            Ok(cached) => {
                if self.is_expired(cached.metadata.expires_at) {
                    tracing::debug!("cache expired for {}: {}", kind, key);
                    CacheResult::Expired
                } else {
                    tracing::debug!("cache hit for {}: {}", kind, key);
                    CacheResult::Hit(cached.payload)
                }
            }
            Err(_) => {
                tracing::debug!("cache miss for {}: {}", kind, key);
                CacheResult::Miss
            }
        }
    }

    fn store<T: Serialize + Clone>(&self, path: &Path, input: &str, ttl_seconds: u64, payload: &T) {
        let cached = CachedEntry {
            metadata: CacheMetadata {
                cached_at: now_unix(),
                expires_at: now_unix() + ttl_seconds,
                input: input.to_string(),
            },
            payload: payload.clone(),
        };

        if let Err(e) = self.write_cache_file(path, &cached) {
            tracing::warn!("failed to write cache entry: {}", e);
        }
    }

    /// Read a cached file and deserialize it
    fn read_cache_file<T: for<'de> Deserialize<'de>>(
        &self,
        path: &Path,
    ) -> Result<T, std::io::Error> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Serialize and write a cached file
    fn write_cache_file<T: Serialize>(&self, path: &Path, data: &T) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(data)?;
        fs::write(path, content)
    }

    /// Clear all cached data
    pub fn clear_all(&self) -> std::io::Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let _ = fs::remove_dir_all(&self.base_dir);
        self.initialize()?;
        tracing::info!("cache cleared");
        Ok(())
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        if !self.is_enabled() {
            return CacheStats::disabled();
        }

        let search_count = self.search_dir.read_dir().map(|e| e.count()).unwrap_or(0);
        let abstract_count = self.abstract_dir.read_dir().map(|e| e.count()).unwrap_or(0);

        let search_size = self.dir_size(&self.search_dir).unwrap_or(0) / 1024; // KB
        let abstract_size = self.dir_size(&self.abstract_dir).unwrap_or(0) / 1024; // KB

        CacheStats {
            enabled: true,
            cache_dir: self.base_dir.clone(),
            search_count,
            abstract_count,
            total_size_kb: search_size + abstract_size,
            ttl_search: Duration::from_secs(self.config.search_ttl_seconds),
            ttl_abstracts: Duration::from_secs(self.config.abstract_ttl_seconds),
        }
    }

    /// Calculate the total size of a directory
    #[allow(clippy::only_used_in_recursion)]
    fn dir_size(&self, path: &Path) -> Result<u64, std::io::Error> {
        let mut size = 0;
        if let Ok(entries) = path.read_dir() {
            for entry in entries.flatten() {
                size += if entry.path().is_dir() {
                    self.dir_size(&entry.path()).unwrap_or(0)
                } else {
                    entry.metadata().map(|m| m.len()).unwrap_or(0)
                };
            }
        }
        Ok(size)
    }
}

impl Default for CacheService {
    fn default() -> Self {
        Self::new()
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Statistics about the cache
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Whether caching is enabled
    pub enabled: bool,

    /// Cache directory path
    pub cache_dir: PathBuf,

    /// Number of cached search outcomes
    pub search_count: usize,

    /// Number of cached abstract details
    pub abstract_count: usize,

    /// Total size in KB
    pub total_size_kb: u64,

    /// TTL for search outcomes
    pub ttl_search: Duration,

    /// TTL for abstract details
    pub ttl_abstracts: Duration,
}

impl CacheStats {
    /// Return stats indicating cache is disabled
    fn disabled() -> Self {
        Self {
            enabled: false,
            cache_dir: PathBuf::new(),
            search_count: 0,
            abstract_count: 0,
            total_size_kb: 0,
            ttl_search: Duration::ZERO,
            ttl_abstracts: Duration::ZERO,
        }
    }
}
