use crate::api::paths::{BASE, prefix_url};
use crate::api::{ApiError, ApiResult, RemoteApi};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the definitions database for one language lives, and whether the
/// copy on disk still matches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestLocation {
    pub language: String,
    pub version: String,
    /// Remote path of the database
    pub location: String,
    /// Location recorded next to the local database, if any
    pub stored: Option<String>,
    pub changed: bool,
}

impl ManifestLocation {
    pub fn download_url(&self) -> String {
        prefix_url(&self.location, BASE)
    }
}

/// Sidecar file that records which remote location a local database came from.
pub fn hint_path_for(manifest: &Path) -> PathBuf {
    manifest.with_extension("location")
}

fn read_hint(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn write_hint(path: &Path, location: &str) -> std::io::Result<()> {
    std::fs::write(path, location)
}

/// Ask the remote system where the current database is, racing the request
/// against `timeout`, and compare it with the local hint.
pub async fn locate_manifest(
    api: &dyn RemoteApi,
    language: &str,
    timeout: Duration,
    hint: &Path,
) -> ApiResult<ManifestLocation> {
    let info = tokio::time::timeout(timeout, api.get_manifest())
        .await
        .map_err(|_| ApiError::Timeout(timeout.as_millis() as u64))??;

    let location = info
        .mobile_world_content_paths
        .get(language)
        .cloned()
        .ok_or_else(|| ApiError::platform(0, "UnknownLanguage", format!("no manifest for language {language}")))?;

    let stored = read_hint(hint);
    let changed = match &stored {
        None => {
            tracing::info!("manifest might not be stored");
            true
        }
        Some(prev) if *prev != location => {
            tracing::info!(stored = %prev, remote = %location, "manifest version mismatch");
            true
        }
        Some(_) => {
            tracing::debug!("manifest has not changed");
            false
        }
    };

    Ok(ManifestLocation {
        language: language.to_string(),
        version: info.version,
        location,
        stored,
        changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_sits_next_to_the_database() {
        assert_eq!(
            hint_path_for(Path::new("/data/manifest.sqlite3")),
            PathBuf::from("/data/manifest.location")
        );
    }

    #[test]
    fn download_url_is_absolute() {
        let loc = ManifestLocation {
            language: "en".into(),
            version: "1".into(),
            location: "/common/destiny2_content/sqlite/en/world.content".into(),
            stored: None,
            changed: true,
        };
        assert_eq!(
            loc.download_url(),
            "https://www.bungie.net/common/destiny2_content/sqlite/en/world.content"
        );
    }
}
