//! The action-time lookup table: action name → duration in seconds.
//!
//! The table lives in a mutable JSON file next to a read-only master copy.
//! `overwrite` replaces the whole table, `reset` copies the master bytes over
//! the current file. There is no locking: concurrent writers race and the last
//! write wins.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RecipeError, Result};
use crate::io;

// ---------------------------------------------------------------------------
// ActionTimeTable
// ---------------------------------------------------------------------------

/// Actions keep the order of the source document: file order on read,
/// record order on overwrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ActionTimeTable(serde_json::Map<String, serde_json::Value>);

impl<'de> Deserialize<'de> for ActionTimeTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        if let Some((action, value)) = map.iter().find(|(_, v)| !v.is_number()) {
            return Err(D::Error::custom(format!(
                "action '{action}' has non-numeric time {value}"
            )));
        }
        Ok(Self(map))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTimeRecord {
    pub action: String,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub time: serde_json::Number,
}

fn number_or_numeric_string<'de, D>(deserializer: D) -> std::result::Result<serde_json::Number, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => Ok(n),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<u64>() {
                return Ok(n.into());
            }
            s.parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .ok_or_else(|| D::Error::custom(format!("invalid time value '{s}'")))
        }
        other => Err(D::Error::custom(format!("invalid time value {other}"))),
    }
}

impl ActionTimeTable {
    /// Later records for the same action replace earlier ones in place.
    pub fn from_records(records: impl IntoIterator<Item = ActionTimeRecord>) -> Self {
        let mut map = serde_json::Map::new();
        for record in records {
            map.insert(record.action, serde_json::Value::Number(record.time));
        }
        Self(map)
    }

    pub fn seconds(&self, action: &str) -> Option<f64> {
        self.0.get(action).and_then(serde_json::Value::as_f64)
    }

    pub fn records(&self) -> Vec<ActionTimeRecord> {
        self.0
            .iter()
            .filter_map(|(action, time)| match time {
                serde_json::Value::Number(n) => Some(ActionTimeRecord {
                    action: action.clone(),
                    time: n.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// Storage boundary for the table: the current document and its master copy.
pub trait TableBackend: Send + Sync {
    fn read_current(&self) -> Result<Vec<u8>>;
    fn write_current(&self, data: &[u8]) -> Result<()>;
    fn read_master(&self) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct FileBackend {
    pub current: PathBuf,
    pub master: PathBuf,
}

impl FileBackend {
    pub fn new(current: PathBuf, master: PathBuf) -> Self {
        Self { current, master }
    }
}

fn read_file(path: &std::path::Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => RecipeError::NotFound(path.display().to_string()),
        _ => RecipeError::Io(e),
    })
}

impl TableBackend for FileBackend {
    fn read_current(&self) -> Result<Vec<u8>> {
        read_file(&self.current)
    }

    fn write_current(&self, data: &[u8]) -> Result<()> {
        io::atomic_write(&self.current, data)
    }

    fn read_master(&self) -> Result<Vec<u8>> {
        read_file(&self.master)
    }
}

/// In-memory backend for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    current: Mutex<Vec<u8>>,
    master: Vec<u8>,
}

impl MemoryBackend {
    pub fn new(master: impl Into<Vec<u8>>) -> Self {
        let master = master.into();
        Self {
            current: Mutex::new(master.clone()),
            master,
        }
    }
}

impl TableBackend for MemoryBackend {
    fn read_current(&self) -> Result<Vec<u8>> {
        Ok(self
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn write_current(&self, data: &[u8]) -> Result<()> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = data.to_vec();
        Ok(())
    }

    fn read_master(&self) -> Result<Vec<u8>> {
        Ok(self.master.clone())
    }
}

// ---------------------------------------------------------------------------
// ActionTimeStore
// ---------------------------------------------------------------------------

pub struct ActionTimeStore<B: TableBackend> {
    backend: B,
}

impl ActionTimeStore<FileBackend> {
    pub fn open(current: PathBuf, master: PathBuf) -> Self {
        Self::new(FileBackend::new(current, master))
    }
}

impl<B: TableBackend> ActionTimeStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn read(&self) -> Result<ActionTimeTable> {
        let data = self.backend.read_current()?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn read_raw(&self) -> Result<Vec<u8>> {
        self.backend.read_current()
    }

    /// Replace the whole table with `records`.
    pub fn overwrite(&self, records: Vec<ActionTimeRecord>) -> Result<ActionTimeTable> {
        let table = ActionTimeTable::from_records(records);
        let data = io::to_pretty_json(&table)?;
        self.backend.write_current(&data)?;
        tracing::info!(actions = table.len(), "action-time table overwritten");
        Ok(table)
    }

    /// Restore the current table from the master copy, byte for byte.
    pub fn reset(&self) -> Result<()> {
        let master = self.backend.read_master()?;
        self.backend.write_current(&master)?;
        tracing::info!("action-time table reset from master");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MASTER: &str = "{\n    \"切る\": 60,\n    \"煮る\": 600\n}";

    fn record(action: &str, time: u64) -> ActionTimeRecord {
        ActionTimeRecord {
            action: action.into(),
            time: time.into(),
        }
    }

    #[test]
    fn overwrite_replaces_instead_of_merging() {
        let store = ActionTimeStore::new(MemoryBackend::new(MASTER));
        store.overwrite(vec![record("cut", 30)]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&store.read_raw().unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({ "cut": 30 }));
    }

    #[test]
    fn duplicate_actions_keep_last() {
        let table = ActionTimeTable::from_records(vec![record("cut", 30), record("cut", 45)]);
        assert_eq!(table.seconds("cut"), Some(45.0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn reset_restores_master_bytes() {
        let store = ActionTimeStore::new(MemoryBackend::new(MASTER));
        store.overwrite(vec![record("cut", 30)]).unwrap();
        store.reset().unwrap();
        assert_eq!(store.read_raw().unwrap(), MASTER.as_bytes());
        store.reset().unwrap();
        assert_eq!(store.read_raw().unwrap(), MASTER.as_bytes());
    }

    #[test]
    fn file_backend_roundtrip() {
        let dir = TempDir::new().unwrap();
        let current = dir.path().join("action_time.json");
        let master = dir.path().join("action_time_master.json");
        std::fs::write(&master, MASTER).unwrap();

        let store = ActionTimeStore::open(current.clone(), master);
        store.reset().unwrap();
        assert_eq!(std::fs::read_to_string(&current).unwrap(), MASTER);

        let table = store.read().unwrap();
        assert_eq!(table.seconds("煮る"), Some(600.0));
        assert_eq!(table.seconds("焼く"), None);
    }

    #[test]
    fn reset_without_master_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = ActionTimeStore::open(
            dir.path().join("action_time.json"),
            dir.path().join("missing.json"),
        );
        assert!(matches!(store.reset(), Err(RecipeError::NotFound(_))));
    }

    #[test]
    fn records_accept_numeric_strings() {
        let records: Vec<ActionTimeRecord> = serde_json::from_value(serde_json::json!([
            {"action": "切る", "time": "90"},
            {"action": "煮る", "time": 1.5}
        ]))
        .unwrap();
        let table = ActionTimeTable::from_records(records);
        assert_eq!(table.seconds("切る"), Some(90.0));
        assert_eq!(table.seconds("煮る"), Some(1.5));
    }

    #[test]
    fn records_follow_master_order() {
        let store = ActionTimeStore::new(MemoryBackend::new(
            r#"{"煮る": 600, "切る": 60, "焼く": 300}"#,
        ));
        let actions: Vec<String> = store
            .read()
            .unwrap()
            .records()
            .into_iter()
            .map(|r| r.action)
            .collect();
        assert_eq!(actions, vec!["煮る", "切る", "焼く"]);
    }

    #[test]
    fn overwrite_writes_records_in_posted_order() {
        let store = ActionTimeStore::new(MemoryBackend::new(MASTER));
        store
            .overwrite(vec![record("煮る", 600), record("切る", 60), record("煮る", 900)])
            .unwrap();
        let text = String::from_utf8(store.read_raw().unwrap()).unwrap();
        assert_eq!(text, "{\n    \"煮る\": 900,\n    \"切る\": 60\n}");
    }

    #[test]
    fn table_rejects_non_numeric_values() {
        let store = ActionTimeStore::new(MemoryBackend::new(r#"{"切る": "fast"}"#));
        assert!(matches!(store.read(), Err(RecipeError::Json(_))));
    }

    #[test]
    fn records_reject_non_numeric_time() {
        let result: std::result::Result<Vec<ActionTimeRecord>, _> =
            serde_json::from_value(serde_json::json!([{"action": "切る", "time": "soon"}]));
        assert!(result.is_err());
    }
}
