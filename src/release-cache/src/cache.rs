//! The release cache - holds the currently served release.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::{CacheConfig, SelectionPolicy};
use crate::error::CacheResult;
use crate::manifest::{MANIFEST_FILENAME, patch_manifest};
use crate::platform::{classify, resolve_alias};
use crate::release::Release;
use crate::select::select_release;
use crate::source::{GitHubClient, ReleaseSource};

/// Snapshot of the cached release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    /// Tag of the cached release
    pub version: Option<String>,
    /// Release notes
    pub notes: Option<String>,
    /// Publication time of the cached release
    pub published_at: Option<DateTime<Utc>>,
    pub is_prerelease: bool,
    /// Download URL by platform id
    pub platforms: HashMap<String, String>,
    /// Patched `RELEASES` manifest
    pub manifest_text: Option<String>,
}

impl CacheEntry {
    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.version.is_none()
    }

    /// Download URL for a platform id or one of its aliases (`"mac"`, `"windows"`, ...).
    pub fn download_url(&self, platform: &str) -> Option<&str> {
        if let Some(url) = self.platforms.get(platform) {
            return Some(url);
        }
        let id = resolve_alias(platform)?;
        self.platforms.get(&id).map(String::as_str)
    }
}

/// Result of [`ReleaseCache::ingest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The release replaced the cached one
    Cached,
    /// The release is already cached
    AlreadyCached,
    /// The release has no usable asset list
    MalformedAssets,
}

/// Result of [`ReleaseCache::refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new release is now cached
    Updated { version: String },
    /// The selected release is already cached
    AlreadyCached,
    /// No release matched the selection policy
    NoMatchingRelease,
    /// The selected release could not be ingested
    Skipped,
    /// The release list could not be fetched
    FetchFailed,
}

impl From<(IngestOutcome, &Release)> for RefreshOutcome {
    fn from((outcome, release): (IngestOutcome, &Release)) -> Self {
        match outcome {
            IngestOutcome::Cached => Self::Updated {
                version: release.tag.clone(),
            },
            IngestOutcome::AlreadyCached => Self::AlreadyCached,
            IngestOutcome::MalformedAssets => Self::Skipped,
        }
    }
}

/// In-memory cache of the latest release.
///
/// Readers always see a complete [`CacheEntry`]: ingestion builds the next
/// entry on the side and swaps it in. Writers are serialised.
pub struct ReleaseCache {
    source: Arc<dyn ReleaseSource>,
    config: CacheConfig,
    entry: RwLock<Arc<CacheEntry>>,
    last_refresh: RwLock<Option<DateTime<Utc>>>,
    writer: Mutex<()>,
}

impl ReleaseCache {
    /// Create a cache backed by the GitHub Releases API.
    pub fn new(config: CacheConfig) -> CacheResult<Self> {
        config.validate()?;
        let source = Arc::new(GitHubClient::new(&config));
        Ok(Self::from_parts(config, source))
    }

    /// Create a cache backed by a custom release source.
    pub fn with_source(config: CacheConfig, source: Arc<dyn ReleaseSource>) -> CacheResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, source))
    }

    fn from_parts(config: CacheConfig, source: Arc<dyn ReleaseSource>) -> Self {
        Self {
            source,
            config,
            entry: RwLock::new(Arc::new(CacheEntry::default())),
            last_refresh: RwLock::new(None),
            writer: Mutex::new(()),
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Selection policy in effect.
    pub fn policy(&self) -> SelectionPolicy {
        self.config.policy()
    }

    /// Current snapshot.
    pub fn read(&self) -> Arc<CacheEntry> {
        self.entry.read().clone()
    }

    /// Time of the last successful release list fetch.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.read()
    }

    /// Whether the configured interval has passed since the last successful fetch.
    pub fn is_outdated(&self) -> bool {
        let Some(last) = self.last_refresh() else {
            return true;
        };
        match chrono::Duration::from_std(self.config.interval()) {
            Ok(interval) => Utc::now() - last >= interval,
            Err(_) => false,
        }
    }

    /// Refresh if outdated, then return the current snapshot.
    pub async fn load(&self) -> Arc<CacheEntry> {
        if self.is_outdated() {
            self.refresh().await;
        }
        self.read()
    }

    /// Pull the release list, select a release and ingest it.
    ///
    /// Never fails: on any error the cached entry is left untouched.
    pub async fn refresh(&self) -> RefreshOutcome {
        let _writer = self.writer.lock().await;

        let releases = match self.source.fetch_releases().await {
            Ok(releases) => releases,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch release list");
                return RefreshOutcome::FetchFailed;
            }
        };
        *self.last_refresh.write() = Some(Utc::now());

        let Some(release) = select_release(&releases, self.policy()) else {
            tracing::debug!(
                count = releases.len(),
                policy = ?self.policy(),
                "No release matches the selection policy"
            );
            return RefreshOutcome::NoMatchingRelease;
        };

        let outcome = self.ingest_locked(release).await;
        (outcome, release).into()
    }

    /// Make `release` the cached release.
    ///
    /// No-op when the release has no usable asset list or is already cached.
    pub async fn ingest(&self, release: &Release) -> IngestOutcome {
        let _writer = self.writer.lock().await;
        self.ingest_locked(release).await
    }

    async fn ingest_locked(&self, release: &Release) -> IngestOutcome {
        let Some(assets) = release.assets.as_deref() else {
            tracing::debug!(version = %release.tag, "Release has no usable asset list");
            return IngestOutcome::MalformedAssets;
        };

        let current = self.read();
        if current.version.as_deref() == Some(release.tag.as_str()) {
            tracing::debug!(version = %release.tag, "Cached version is the same as latest");
            return IngestOutcome::AlreadyCached;
        }

        tracing::info!(version = %release.tag, "Caching version");

        let mut next = CacheEntry {
            version: Some(release.tag.clone()),
            notes: release.notes.clone(),
            published_at: release.published_at,
            is_prerelease: release.is_prerelease,
            platforms: HashMap::new(),
            manifest_text: None,
        };

        for asset in assets {
            if asset.name == MANIFEST_FILENAME {
                match self.fetch_manifest(&asset.download_url).await {
                    Ok(text) => next.manifest_text = Some(text),
                    Err(e) => {
                        tracing::warn!(url = %asset.download_url, error = %e, "Failed to cache RELEASES");
                        // A failed fetch keeps serving the last good manifest
                        if next.manifest_text.is_none() {
                            next.manifest_text = current.manifest_text.clone();
                        }
                    }
                }
                continue;
            }

            match classify(&asset.name) {
                Some(platform) => {
                    next.platforms.insert(platform, asset.download_url.clone());
                }
                None => tracing::trace!(asset = %asset.name, "Skipping unrecognized asset"),
            }
        }

        *self.entry.write() = Arc::new(next);
        tracing::info!(version = %release.tag, "Finished caching version");
        IngestOutcome::Cached
    }

    async fn fetch_manifest(&self, url: &str) -> CacheResult<String> {
        let text = self.source.fetch_text(url).await?;
        Ok(patch_manifest(&text, url)?)
    }
}
