//! Persisted export settings. The CLI remembers the last run's choices in a
//! small JSON file; stale files from other releases are ignored rather than
//! migrated.

use std::fs;
use std::path::Path;

use aeblend_core::{ExportError, ExportResult, TimeRangePolicy};
use serde::{Deserialize, Serialize};

/// Settings-file schema version. Bump on any settings change that older
/// files cannot satisfy; mismatched files fall back to defaults.
pub const SETTINGS_VERSION: &str = "0.3";

/// Everything that shapes an export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    /// Which span of the timeline to sample.
    pub time_range: TimeRangePolicy,
    /// Export only the selected layers (plus the ancestors they need).
    pub selected_only: bool,
    /// Flatten transforms to world-space matrix samples.
    pub bake_transforms: bool,
    /// Samples per frame for baked and calculated channels, at least 1.
    pub supersampling: u32,
    /// Re-origin baked camera translation to the composition center.
    pub centered_camera: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            time_range: TimeRangePolicy::default(),
            selected_only: false,
            bake_transforms: false,
            supersampling: 1,
            centered_camera: false,
        }
    }
}

impl ExportSettings {
    /// Supersampling with the at-least-1 floor applied.
    pub fn effective_supersampling(&self) -> u32 {
        self.supersampling.max(1)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSettings {
    version: String,
    #[serde(flatten)]
    settings: ExportSettings,
}

/// Read settings from a previous run. Returns `None` when the file is
/// missing, unreadable, malformed, or from a different settings version;
/// the caller falls back to defaults in every one of those cases.
pub fn read_settings_file(path: &Path) -> Option<ExportSettings> {
    let text = fs::read_to_string(path).ok()?;
    let persisted: PersistedSettings = match serde_json::from_str(&text) {
        Ok(p) => p,
        Err(error) => {
            tracing::debug!(?path, %error, "ignoring malformed settings file");
            return None;
        }
    };
    if persisted.version != SETTINGS_VERSION {
        tracing::debug!(
            ?path,
            found = %persisted.version,
            expected = SETTINGS_VERSION,
            "ignoring settings file from another version"
        );
        return None;
    }
    Some(persisted.settings)
}

/// Persist settings for the next run.
pub fn write_settings_file(path: &Path, settings: &ExportSettings) -> ExportResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ExportError::output(e.to_string(), parent.to_path_buf()))?;
    }
    let persisted = PersistedSettings {
        version: SETTINGS_VERSION.to_string(),
        settings: settings.clone(),
    };
    let text = serde_json::to_string_pretty(&persisted)?;
    fs::write(path, text).map_err(|e| ExportError::output(e.to_string(), path.to_path_buf()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ExportSettings::default();
        assert_eq!(settings.time_range, TimeRangePolicy::WholeComp);
        assert!(!settings.bake_transforms);
        assert_eq!(settings.supersampling, 1);
    }

    #[test]
    fn test_supersampling_floor() {
        let settings = ExportSettings {
            supersampling: 0,
            ..ExportSettings::default()
        };
        assert_eq!(settings.effective_supersampling(), 1);
    }

    #[test]
    fn test_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = ExportSettings {
            time_range: TimeRangePolicy::WorkArea,
            selected_only: true,
            bake_transforms: true,
            supersampling: 4,
            centered_camera: true,
        };
        write_settings_file(&path, &settings).unwrap();
        assert_eq!(read_settings_file(&path), Some(settings));
    }

    #[test]
    fn test_missing_file_is_none() {
        assert_eq!(read_settings_file(Path::new("/no/such/settings.json")), None);
    }

    #[test]
    fn test_version_mismatch_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut value =
            serde_json::to_value(&PersistedSettings {
                version: SETTINGS_VERSION.to_string(),
                settings: ExportSettings::default(),
            })
            .unwrap();
        value["version"] = "0.1".into();
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();
        assert_eq!(read_settings_file(&path), None);
    }

    #[test]
    fn test_malformed_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(read_settings_file(&path), None);
    }
}
