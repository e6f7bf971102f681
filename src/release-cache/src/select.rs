//! Choosing the authoritative release out of a release list.

use crate::config::SelectionPolicy;
use crate::release::Release;

/// Pick at most one release according to `policy`.
///
/// `releases` is expected newest-first, as the upstream API lists them.
/// Drafts are never candidates. `None` means "leave the cache as it is".
pub fn select_release(releases: &[Release], policy: SelectionPolicy) -> Option<&Release> {
    let latest = move |prerelease: bool| {
        releases
            .iter()
            .find(|release| !release.is_draft && release.is_prerelease == prerelease)
    };

    if policy.only_prerelease {
        return latest(true);
    }

    if !policy.include_prerelease {
        return latest(false);
    }

    let stable = latest(false).filter(|release| release.has_assets());
    let prerelease = latest(true).filter(|release| release.has_assets());

    match (stable, prerelease) {
        (Some(stable), Some(prerelease)) => Some(newest(stable, prerelease)),
        (stable, prerelease) => stable.or(prerelease),
    }
}

/// Later publication wins; a tie goes to the stable release.
fn newest<'a>(stable: &'a Release, prerelease: &'a Release) -> &'a Release {
    if stable.published_at >= prerelease.published_at {
        stable
    } else {
        prerelease
    }
}
