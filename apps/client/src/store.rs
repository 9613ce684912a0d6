//! Versioned local state: identity, points and history in one JSON document.
//!
//! Version 0 is the schema-free key-value layout (`civicGuestUser`,
//! `civicPoints`, `civicHistory`, each value a JSON-encoded string).
//! Loading always migrates forward to `SCHEMA_VERSION`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::history::HistoryEntry;
use crate::session::User;

/// Current document version.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientState {
    pub schema_version: u32,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub points: u32,
    /// Newest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            user: None,
            points: 0,
            history: Vec::new(),
        }
    }
}

/// File-backed store for `ClientState`.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and migrates the document; a missing file is a fresh state.
    pub async fn load(&self) -> Result<ClientState> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state file at {}, starting fresh", self.path.display());
                return Ok(ClientState::default());
            }
            Err(e) => return Err(e.into()),
        };

        let raw: Value = serde_json::from_str(&text)?;
        migrate(raw)
    }

    /// Writes via a temp file and rename so a crash never leaves half a document.
    pub async fn save(&self, state: &ClientState) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(state)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn schema_version(raw: &Value) -> u32 {
    raw.get("schema_version")
        .and_then(Value::as_u64)
        .map(|v| v as u32)
        .unwrap_or(0)
}

/// Runs all pending migrations.
pub fn migrate(raw: Value) -> Result<ClientState> {
    let current_version = schema_version(&raw);
    if current_version > SCHEMA_VERSION {
        return Err(ClientError::UnsupportedSchema(current_version));
    }

    let mut doc = raw;
    if current_version < SCHEMA_VERSION {
        info!(
            "Migrating client state from version {} to {}",
            current_version, SCHEMA_VERSION
        );

        if current_version < 1 {
            doc = migrate_v1(&doc)?;
        }
    }

    Ok(serde_json::from_value(doc)?)
}

/// v0 → v1: lift the legacy key-value entries into one typed document.
fn migrate_v1(legacy: &Value) -> Result<Value> {
    let user = match legacy.get("civicGuestUser") {
        Some(value) => decode_embedded(value)?,
        None => Value::Null,
    };

    let points = match legacy.get("civicPoints") {
        Some(Value::String(s)) => s.trim().parse::<u32>().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0) as u32,
        _ => 0,
    };

    let history = match legacy.get("civicHistory") {
        Some(value) => decode_embedded(value)?,
        None => Value::Array(Vec::new()),
    };
    let history = if history.is_null() {
        Value::Array(Vec::new())
    } else {
        history
    };

    Ok(json!({
        "schema_version": 1,
        "user": user,
        "points": points,
        "history": history,
    }))
}

/// Legacy values were stored as JSON text inside a string.
fn decode_embedded(value: &Value) -> Result<Value> {
    match value {
        Value::String(text) => Ok(serde_json::from_str(text)?),
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ReportStatus;

    #[tokio::test]
    async fn test_load_missing_file_is_fresh_state() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StateStore::new(tmp.path().join("state.json"));
        let state = store.load().await.unwrap();
        assert_eq!(state, ClientState::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StateStore::new(tmp.path().join("nested").join("state.json"));
        let state = ClientState {
            user: Some(User::guest("Meera").unwrap()),
            points: 150,
            ..ClientState::default()
        };

        store.save(&state).await.unwrap();

        assert_eq!(store.load().await.unwrap(), state);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_migrates_legacy_key_value_layout() {
        let legacy = json!({
            "civicGuestUser": "{\"displayName\":\"Ravi\",\"email\":\"ravi@citizen.com\",\"photoURL\":\"https://cdn-icons-png.flaticon.com/512/149/149071.png\"}",
            "civicPoints": "150",
            "civicHistory": "[{\"id\":1767225600000,\"date\":\"1/1/2026\",\"category\":\"Garbage Dump\",\"location\":\"Chetak Circle\",\"status\":\"Submitted\"}]"
        });

        let state = migrate(legacy).unwrap();

        assert_eq!(state.schema_version, SCHEMA_VERSION);
        assert_eq!(state.user.unwrap().display_name, "Ravi");
        assert_eq!(state.points, 150);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].status, ReportStatus::Submitted);
        assert!(state.history[0].image_url.is_none());
    }

    #[test]
    fn test_migrates_partial_legacy_layout() {
        let state = migrate(json!({ "civicPoints": "not-a-number" })).unwrap();
        assert!(state.user.is_none());
        assert_eq!(state.points, 0);
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_rejects_future_schema() {
        let err = migrate(json!({ "schema_version": 99 })).unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedSchema(99)));
    }

    #[tokio::test]
    async fn test_legacy_file_on_disk_is_migrated_and_rewritten() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(&path, r#"{"civicPoints": "50", "civicGuestUser": null}"#).unwrap();
        let store = StateStore::new(&path);

        let state = store.load().await.unwrap();
        store.save(&state).await.unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["schema_version"], 1);
        assert_eq!(raw["points"], 50);
    }
}
