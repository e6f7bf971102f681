//! Rewriting of `RELEASES` manifests (Squirrel differential-update descriptors).
//!
//! A manifest lists package files by bare name, one record per line:
//!
//! ```text
//! 94689FEA6DC5A7C8E8E6AB0E8A2B5C1E2F1A7E93 App-1.2.3-full.nupkg 61440512
//! ```
//!
//! Clients resolve that name relative to where they fetched the manifest, which
//! breaks once the manifest is served from the cache instead of the release host.
//! [`patch_manifest`] swaps the bare name for the absolute download URL.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::ManifestError;

/// Asset name of the manifest in a release.
pub const MANIFEST_FILENAME: &str = "RELEASES";

/// Package file reference inside a manifest.
static PACKAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[^\s]*\.nupkg").expect("Invalid package name regex"));

/// Find the first package file name referenced by a manifest.
pub fn find_package_name(manifest: &str) -> Option<&str> {
    PACKAGE_PATTERN.find(manifest).map(|m| m.as_str())
}

/// URL of `package_name` hosted next to the manifest at `source_url`.
pub fn resolve_package_url(source_url: &str, package_name: &str) -> Result<String, ManifestError> {
    let invalid = || ManifestError::InvalidSourceUrl {
        url: source_url.to_string(),
    };

    let base = Url::parse(source_url).map_err(|_| invalid())?;
    if base.cannot_be_a_base() {
        return Err(invalid());
    }

    let mut resolved = base;
    resolved
        .path_segments_mut()
        .map_err(|_| invalid())?
        .pop()
        .push(package_name);
    Ok(resolved.to_string())
}

/// Rewrite the package reference of a manifest fetched from `source_url`.
///
/// Every occurrence of the referenced package name is replaced by its absolute
/// URL; the rest of the text is left untouched.
pub fn patch_manifest(manifest: &str, source_url: &str) -> Result<String, ManifestError> {
    let package_name = find_package_name(manifest).ok_or(ManifestError::NoPackageReference)?;
    let package_url = resolve_package_url(source_url, package_name)?;
    Ok(manifest.replace(package_name, &package_url))
}
