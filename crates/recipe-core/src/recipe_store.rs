//! Recipe records kept as JSON files under the import and export folders.
//!
//! Every path segment here comes from a request body and is validated with
//! [`paths::validate_segment`] before touching the filesystem.

use std::path::PathBuf;

use serde_json::Value;

use crate::config::ResolvedPaths;
use crate::error::{RecipeError, Result};
use crate::ingredients::ingredients_to_json;
use crate::io;
use crate::paths;

const SOURCE_KEYS: [&str; 2] = ["sourceRefference", "sourceReference"];

#[derive(Debug, Clone)]
pub struct RecipeStore {
    import_dir: PathBuf,
    export_dir: PathBuf,
}

impl RecipeStore {
    pub fn new(import_dir: PathBuf, export_dir: PathBuf) -> Self {
        Self {
            import_dir,
            export_dir,
        }
    }

    pub fn from_paths(paths: &ResolvedPaths) -> Self {
        Self::new(paths.import_data.clone(), paths.export_data.clone())
    }

    /// Entries of the import folder, created on first use.
    pub fn list_sources(&self) -> Result<Vec<String>> {
        io::ensure_dir(&self.import_dir)?;
        io::list_dir(&self.import_dir)
    }

    /// Files recorded under one source folder.
    pub fn list_source(&self, source: &str) -> Result<Vec<String>> {
        io::list_dir(&paths::join_segments(&self.import_dir, &[source])?)
    }

    pub fn read_import(&self, source: &str, file: &str) -> Result<Value> {
        io::read_json(&paths::join_segments(&self.import_dir, &[source, file])?)
    }

    pub fn read_export(&self, file: &str) -> Result<Value> {
        io::read_json(&paths::join_segments(&self.export_dir, &[file])?)
    }

    /// Write `record` to `<import>/<sourceRefference>/<title>.json`, with its
    /// `ingredients` text replaced by a name → quantity object.
    pub fn export(&self, mut record: Value) -> Result<PathBuf> {
        let object = record
            .as_object_mut()
            .ok_or_else(|| RecipeError::InvalidRecord("record must be a JSON object".into()))?;

        let source = SOURCE_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .ok_or_else(|| RecipeError::InvalidRecord("missing sourceRefference".into()))?
            .to_string();
        let title = object
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| RecipeError::InvalidRecord("missing title".into()))?
            .to_string();

        match object.get("ingredients") {
            Some(Value::String(text)) => {
                let parsed = ingredients_to_json(text)?;
                object.insert("ingredients".into(), parsed);
            }
            Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(RecipeError::InvalidRecord(
                    "ingredients must be text".into(),
                ))
            }
            None => return Err(RecipeError::InvalidRecord("missing ingredients".into())),
        }

        let file = format!("{title}.json");
        let path = paths::join_segments(&self.import_dir, &[&source, &file])?;
        io::write_pretty_json(&path, &record)?;
        tracing::info!(path = %path.display(), "exported recipe record");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> RecipeStore {
        RecipeStore::new(dir.path().join("import_data"), dir.path().join("build/dest"))
    }

    #[test]
    fn list_sources_creates_import_dir() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.list_sources().unwrap().is_empty());
        assert!(dir.path().join("import_data").is_dir());
    }

    #[test]
    fn export_then_import_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let path = store
            .export(json!({
                "sourceRefference": "orangepage",
                "title": "肉じゃが",
                "ingredients": "じゃがいも\u{3000}3個\n牛肉\u{3000}200g\n",
                "steps": "煮る"
            }))
            .unwrap();
        assert!(path.ends_with("import_data/orangepage/肉じゃが.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("    \"title\": \"肉じゃが\""));

        assert_eq!(store.list_sources().unwrap(), vec!["orangepage"]);
        assert_eq!(store.list_source("orangepage").unwrap(), vec!["肉じゃが.json"]);
        let back = store.read_import("orangepage", "肉じゃが.json").unwrap();
        assert_eq!(back["ingredients"], json!({ "じゃがいも": "3個", "牛肉": "200g" }));
        assert_eq!(back["steps"], "煮る");
    }

    #[test]
    fn export_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir)
            .export(json!({
                "sourceRefference": "..",
                "title": "x",
                "ingredients": ""
            }))
            .unwrap_err();
        assert!(matches!(err, RecipeError::InvalidPathSegment(_)));

        let err = store(&dir)
            .export(json!({
                "sourceRefference": "ok",
                "title": "../../evil",
                "ingredients": ""
            }))
            .unwrap_err();
        assert!(matches!(err, RecipeError::InvalidPathSegment(_)));
    }

    #[test]
    fn export_requires_fields() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        assert!(matches!(s.export(json!([])), Err(RecipeError::InvalidRecord(_))));
        assert!(matches!(
            s.export(json!({"title": "x", "ingredients": ""})),
            Err(RecipeError::InvalidRecord(_))
        ));
        assert!(matches!(
            s.export(json!({"sourceRefference": "a", "title": "x"})),
            Err(RecipeError::InvalidRecord(_))
        ));
    }

    #[test]
    fn read_export_reads_dest_folder() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("build/dest");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("result.json"), r#"{"ok": true}"#).unwrap();
        assert_eq!(store(&dir).read_export("result.json").unwrap(), json!({"ok": true}));
        assert!(matches!(
            store(&dir).read_export("missing.json"),
            Err(RecipeError::NotFound(_))
        ));
    }
}
