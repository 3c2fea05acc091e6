use std::path::Path;

use anyhow::Result;
use recipe_core::config::Config;

/// Start the HTTP server; `port` overrides `server.port` from `recipe.yaml`.
pub fn run(root: &Path, port: Option<u16>) -> Result<()> {
    let config = Config::load(root)?;
    let port = port.unwrap_or(config.server.port);

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();
    rt.block_on(async move { recipe_server::serve(root_buf, &config, port).await })
}
