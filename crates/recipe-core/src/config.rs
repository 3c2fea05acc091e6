use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// TaggerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggerConfig {
    /// Tagger executable: a bare name looked up on PATH, or a path relative to the root.
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    #[serde(default = "default_morphology_model")]
    pub morphology_model: PathBuf,
    #[serde(default = "default_ner_model")]
    pub ner_model: PathBuf,
}

fn default_binary() -> PathBuf {
    PathBuf::from(paths::KYTEA_BINARY)
}

fn default_morphology_model() -> PathBuf {
    PathBuf::from(paths::KYTEA_MORPHOLOGY_MODEL)
}

fn default_ner_model() -> PathBuf {
    PathBuf::from(paths::KYTEA_NER_MODEL)
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            morphology_model: default_morphology_model(),
            ner_model: default_ner_model(),
        }
    }
}

// ---------------------------------------------------------------------------
// DataConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_action_time")]
    pub action_time: PathBuf,
    #[serde(default = "default_action_time_master")]
    pub action_time_master: PathBuf,
    #[serde(default = "default_action_category")]
    pub action_category: PathBuf,
    #[serde(default = "default_reference")]
    pub reference: PathBuf,
    #[serde(default = "default_graph_data")]
    pub graph_data: PathBuf,
    #[serde(default = "default_import_data")]
    pub import_data: PathBuf,
    #[serde(default = "default_export_data")]
    pub export_data: PathBuf,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_action_time() -> PathBuf {
    PathBuf::from(paths::ACTION_TIME_FILE)
}

fn default_action_time_master() -> PathBuf {
    PathBuf::from(paths::ACTION_TIME_MASTER_FILE)
}

fn default_action_category() -> PathBuf {
    PathBuf::from(paths::ACTION_CATEGORY_FILE)
}

fn default_reference() -> PathBuf {
    PathBuf::from(paths::REFERENCE_FILE)
}

fn default_graph_data() -> PathBuf {
    PathBuf::from(paths::GRAPH_DATA_DIR)
}

fn default_import_data() -> PathBuf {
    PathBuf::from(paths::IMPORT_DATA_DIR)
}

fn default_export_data() -> PathBuf {
    PathBuf::from(paths::EXPORT_DATA_DIR)
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(paths::STATIC_DIR)
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            action_time: default_action_time(),
            action_time_master: default_action_time_master(),
            action_category: default_action_category(),
            reference: default_reference(),
            graph_data: default_graph_data(),
            import_data: default_import_data(),
            export_data: default_export_data(),
            static_dir: default_static_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Project configuration read from `recipe.yaml`. Every field has a default,
/// so a project without the file runs with the stock layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tagger: TaggerConfig,
    #[serde(default)]
    pub data: DataConfig,
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }
}

/// A `Config` with every data path resolved against a project root.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub action_time: PathBuf,
    pub action_time_master: PathBuf,
    pub action_category: PathBuf,
    pub reference: PathBuf,
    pub graph_data: PathBuf,
    pub import_data: PathBuf,
    pub export_data: PathBuf,
    pub static_dir: PathBuf,
}

impl ResolvedPaths {
    pub fn new(root: &Path, data: &DataConfig) -> Self {
        Self {
            action_time: paths::resolve(root, &data.action_time),
            action_time_master: paths::resolve(root, &data.action_time_master),
            action_category: paths::resolve(root, &data.action_category),
            reference: paths::resolve(root, &data.reference),
            graph_data: paths::resolve(root, &data.graph_data),
            import_data: paths::resolve(root, &data.import_data),
            export_data: paths::resolve(root, &data.export_data),
            static_dir: paths::resolve(root, &data.static_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.data.graph_data, PathBuf::from("graph_data"));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("recipe.yaml"),
            "server:\n  port: 8080\ndata:\n  import_data: /var/recipes\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.data.import_data, PathBuf::from("/var/recipes"));
        assert_eq!(cfg.data.export_data, PathBuf::from("build/dest"));
        assert_eq!(cfg.tagger.binary, PathBuf::from(paths::KYTEA_BINARY));
    }

    #[test]
    fn tagger_binary_loads_from_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("recipe.yaml"),
            "tagger:\n  binary: /usr/local/bin/kytea\n",
        )
        .unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.tagger.binary, PathBuf::from("/usr/local/bin/kytea"));
    }

    #[test]
    fn resolved_paths_join_root() {
        let root = Path::new("/srv/app");
        let resolved = ResolvedPaths::new(root, &DataConfig::default());
        assert_eq!(
            resolved.action_time,
            PathBuf::from("/srv/app/action_time/orangepage/action_time.json")
        );
        assert_eq!(resolved.static_dir, PathBuf::from("/srv/app/build"));
    }
}
