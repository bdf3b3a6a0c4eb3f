//! On-disk session configuration, versioned so the shape can evolve.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wiscv_core::models::ConfidenceLevel;

use crate::error::SessionError;

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    /// Where the database lives; platform data dir when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Directory of norm-table JSON files; bundled tables when unset.
    #[serde(default)]
    pub norms_dir: Option<PathBuf>,
    /// Confidence level preselected on new forms. Added in v1.
    #[serde(default)]
    pub default_confidence: ConfidenceLevel,
}

impl SessionConfig {
    pub fn database_path(&self) -> Result<PathBuf, SessionError> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .ok_or_else(|| SessionError::Config("no data directory found".to_string()))?
                .join("wiscv"),
        };
        std::fs::create_dir_all(&dir)?;
        Ok(dir.join("wiscv.db"))
    }
}

fn config_dir() -> Result<PathBuf, SessionError> {
    let base = dirs::config_dir()
        .ok_or_else(|| SessionError::Config("no config directory found".to_string()))?;
    Ok(base.join("wiscv"))
}

fn config_path() -> Result<PathBuf, SessionError> {
    Ok(config_dir()?.join("config.json"))
}

pub fn has_config() -> bool {
    config_path().map(|p| p.exists()).unwrap_or(false)
}

pub fn load_config() -> Result<SessionConfig, SessionError> {
    load_config_from(&config_path()?)
}

pub fn save_config(config: &SessionConfig) -> Result<(), SessionError> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)?;
    save_config_to(&dir.join("config.json"), config)
}

fn load_config_from(path: &Path) -> Result<SessionConfig, SessionError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        SessionError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;

    // Parse as raw JSON so migrations run before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    Ok(serde_json::from_value(migrated)?)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
/// Each migration is a pure transform on the raw JSON value.
fn migrate(
    mut json: serde_json::Value,
    from_version: u32,
) -> Result<serde_json::Value, SessionError> {
    if from_version > CURRENT_VERSION {
        return Err(SessionError::Config(format!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION})"
        )));
    }

    // v0 → v1: add default_confidence
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| SessionError::Config("config is not a JSON object".to_string()))?;
        obj.entry("default_confidence")
            .or_insert(serde_json::Value::String("ninety_five".to_string()));
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (added default_confidence)");
    }

    // Future migrations go here:
    // if from_version < 2 { ... }

    Ok(json)
}

fn save_config_to(path: &Path, config: &SessionConfig) -> Result<(), SessionError> {
    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;
    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity.
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;
    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = SessionConfig {
            norms_dir: Some(PathBuf::from("/tables")),
            default_confidence: ConfidenceLevel::Ninety,
            ..Default::default()
        };
        save_config_to(&path, &config).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.config_version, CURRENT_VERSION);
        assert_eq!(loaded.norms_dir.as_deref(), Some(Path::new("/tables")));
        assert_eq!(loaded.default_confidence, ConfidenceLevel::Ninety);
    }

    #[test]
    fn pre_versioned_configs_are_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"data_dir": "/data"}"#).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.config_version, CURRENT_VERSION);
        assert_eq!(loaded.default_confidence, ConfidenceLevel::NinetyFive);
        assert_eq!(loaded.data_dir.as_deref(), Some(Path::new("/data")));
    }

    #[test]
    fn configs_from_the_future_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"config_version": 99}"#).unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(SessionError::Config(_))
        ));
    }
}
