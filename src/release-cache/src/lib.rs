//! Release Cache - the current downloadable release of a product, kept in memory.
//!
//! Provides the data an auto-update server needs:
//! - Selection of the authoritative release (stable / pre-release policy)
//! - Per-platform download links derived from asset file names
//! - A `RELEASES` manifest rewritten to absolute package URLs
//!
//! # Example
//!
//! ```rust,ignore
//! use release_cache::{CacheConfig, ReleaseCache};
//!
//! let cache = ReleaseCache::new(CacheConfig::from_env()?)?;
//! cache.refresh().await;
//!
//! let entry = cache.read();
//! if let Some(url) = entry.download_url("mac") {
//!     println!("{} for macOS: {}", entry.version.as_deref().unwrap_or("-"), url);
//! }
//! ```

mod cache;
mod config;
mod error;
mod http_client;
mod manifest;
mod platform;
mod release;
mod select;
mod source;

pub use cache::{CacheEntry, IngestOutcome, RefreshOutcome, ReleaseCache};
pub use config::{CacheConfig, SelectionPolicy};
pub use error::{CacheError, CacheResult, ManifestError};
pub use manifest::{MANIFEST_FILENAME, find_package_name, patch_manifest, resolve_package_url};
pub use platform::{classify, resolve_alias};
pub use release::{Asset, Release, parse_release_list};
pub use select::select_release;
pub use source::{GitHubClient, ReleaseSource};

/// Default release-hosting API URL
pub const DEFAULT_API_URL: &str = "https://api.github.com";
