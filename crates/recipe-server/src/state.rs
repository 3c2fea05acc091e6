use std::path::PathBuf;
use std::sync::Arc;

use recipe_core::action_time::{ActionTimeStore, FileBackend};
use recipe_core::config::{Config, ResolvedPaths};
use recipe_core::flowgraph::FlowGraphResources;
use recipe_core::recipe_store::RecipeStore;
use recipe_core::tagger::{KyteaTagger, Tagger};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub paths: Arc<ResolvedPaths>,
    pub tagger: Arc<dyn Tagger>,
}

impl AppState {
    /// State for `root` using the KyTea tagger described by `config`.
    pub fn new(root: PathBuf, config: &Config) -> Self {
        let tagger = Arc::new(KyteaTagger::from_config(&root, &config.tagger));
        Self::with_tagger(root, config, tagger)
    }

    pub fn with_tagger(root: PathBuf, config: &Config, tagger: Arc<dyn Tagger>) -> Self {
        let paths = ResolvedPaths::new(&root, &config.data);
        Self {
            root,
            paths: Arc::new(paths),
            tagger,
        }
    }

    pub fn action_times(&self) -> ActionTimeStore<FileBackend> {
        ActionTimeStore::open(
            self.paths.action_time.clone(),
            self.paths.action_time_master.clone(),
        )
    }

    pub fn recipes(&self) -> RecipeStore {
        RecipeStore::from_paths(&self.paths)
    }

    /// Load the flow-graph artifacts. Blocking; call from `spawn_blocking`.
    pub fn graph_resources(&self) -> recipe_core::Result<FlowGraphResources> {
        let resources = FlowGraphResources::load(&self.paths.graph_data)?;
        tracing::debug!(dir = %self.paths.graph_data.display(), "loaded flow-graph artifacts");
        Ok(resources)
    }
}
