//! Mapping of asset file names to platform identifiers.

/// Suffix appended to platform ids of ARM64 builds.
pub const ARM64_SUFFIX: &str = "_arm64";

/// Platform ids that are derived directly from a file extension.
const EXTENSION_PLATFORMS: &[(&str, &str)] = &[
    ("exe", "win32"),
    ("dmg", "dmg"),
    ("deb", "deb"),
    ("rpm", "rpm"),
    ("appimage", "AppImage"),
];

/// User-facing names accepted for each platform id.
const ALIASES: &[(&str, &[&str])] = &[
    ("darwin", &["darwin", "mac", "macos", "osx"]),
    ("win32", &["win32", "windows", "win", "exe"]),
    ("dmg", &["dmg"]),
    ("deb", &["deb", "debian"]),
    ("rpm", &["rpm", "fedora"]),
    ("AppImage", &["appimage", "linux"]),
];

/// Classify an asset file name.
///
/// Returns `None` for anything that is not an installer we know how to serve.
pub fn classify(filename: &str) -> Option<String> {
    let lower = filename.to_ascii_lowercase();
    let (stem, extension) = lower.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }

    let base = if extension == "zip" {
        ["mac", "darwin", "osx"]
            .iter()
            .any(|hint| stem.contains(hint))
            .then_some("darwin")?
    } else {
        EXTENSION_PLATFORMS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, platform)| *platform)?
    };

    let arm64 = stem.contains("arm64") || stem.contains("aarch64");
    Some(if arm64 {
        format!("{base}{ARM64_SUFFIX}")
    } else {
        base.to_string()
    })
}

/// Resolve a user-facing platform name (e.g. `"mac"`, `"windows_arm64"`) to a platform id.
pub fn resolve_alias(name: &str) -> Option<String> {
    let lower = name.trim().to_ascii_lowercase();
    let (alias, suffix) = match lower.strip_suffix(ARM64_SUFFIX) {
        Some(alias) => (alias, ARM64_SUFFIX),
        None => (lower.as_str(), ""),
    };

    ALIASES
        .iter()
        .find(|(_, names)| names.contains(&alias))
        .map(|(platform, _)| format!("{platform}{suffix}"))
}
