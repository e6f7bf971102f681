//! Release records as returned by the release-hosting API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{CacheError, CacheResult};

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// File name (e.g. `"App-1.2.3-mac.zip"`)
    pub name: String,
    /// Direct download URL
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

impl Asset {
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
        }
    }
}

/// A tagged release. Does not contain all fields of the upstream record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Version tag (e.g. `"v2.0.0"`)
    #[serde(rename = "tag_name")]
    pub tag: String,
    /// Release notes
    #[serde(rename = "body", default)]
    pub notes: Option<String>,
    /// Publication time; drafts have none
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(rename = "draft", default)]
    pub is_draft: bool,
    #[serde(rename = "prerelease", default)]
    pub is_prerelease: bool,
    /// Attached files, `None` when upstream sent no usable list
    #[serde(default, deserialize_with = "lenient_assets")]
    pub assets: Option<Vec<Asset>>,
}

impl Release {
    /// Whether the release carries a usable asset list.
    pub fn has_assets(&self) -> bool {
        self.assets.is_some()
    }
}

/// Accept anything for `assets`; only a list of well-formed assets survives.
fn lenient_assets<'de, D>(deserializer: D) -> Result<Option<Vec<Asset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_array() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Decode a release list, dropping entries that do not look like releases.
///
/// Fails only when the document itself is not a list.
pub fn parse_release_list(value: Value) -> CacheResult<Vec<Release>> {
    let Value::Array(entries) = value else {
        return Err(CacheError::MalformedResponse {
            message: "expected a JSON array of releases".to_string(),
        });
    };

    let releases = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Release>(entry) {
            Ok(release) => Some(release),
            Err(e) => {
                tracing::debug!(index, error = %e, "Dropping malformed release entry");
                None
            }
        })
        .collect();

    Ok(releases)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_release_fields() {
        let releases = parse_release_list(json!([{
            "tag_name": "v2.0.0",
            "body": "Bug fixes",
            "published_at": "2024-03-01T12:00:00Z",
            "draft": false,
            "prerelease": true,
            "assets": [
                {"name": "App-mac.zip", "browser_download_url": "https://example.com/App-mac.zip", "size": 10}
            ]
        }]))
        .unwrap();

        assert_eq!(releases.len(), 1);
        let release = &releases[0];
        assert_eq!(release.tag, "v2.0.0");
        assert_eq!(release.notes.as_deref(), Some("Bug fixes"));
        assert!(release.is_prerelease);
        assert!(!release.is_draft);
        assert_eq!(
            release.published_at.map(|t| t.to_rfc3339()),
            Some("2024-03-01T12:00:00+00:00".to_string())
        );
        assert_eq!(
            release.assets.as_deref(),
            Some(&[Asset::new("App-mac.zip", "https://example.com/App-mac.zip")][..])
        );
    }

    #[test]
    fn test_missing_or_invalid_assets_decode_as_none() {
        let releases = parse_release_list(json!([
            {"tag_name": "v1", "published_at": null},
            {"tag_name": "v2", "assets": "nope"},
            {"tag_name": "v3", "assets": [{"name": "no-url"}]},
            {"tag_name": "v4", "assets": []}
        ]))
        .unwrap();

        let assets: Vec<_> = releases.iter().map(|r| r.has_assets()).collect();
        assert_eq!(assets, vec![false, false, false, true]);
    }

    #[test]
    fn test_malformed_entries_are_dropped() {
        let releases = parse_release_list(json!([
            {"name": "no tag"},
            42,
            {"tag_name": "v1.0.0", "assets": []}
        ]))
        .unwrap();

        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].tag, "v1.0.0");
    }

    #[test]
    fn test_non_array_document_is_rejected() {
        let err = parse_release_list(json!({"message": "Not Found"})).unwrap_err();
        assert!(matches!(err, CacheError::MalformedResponse { .. }));
    }
}
