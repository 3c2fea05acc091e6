use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use recipe_core::token::NerText;

use super::DataBody;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowGraphRequest {
    pub ner_text: NerText,
}

/// POST /flowgraph: build the recipe flow graph from tagged text.
pub async fn flowgraph(
    State(app): State<AppState>,
    Json(body): Json<DataBody<FlowGraphRequest>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tokens = body.data.ner_text.into_tokens()?;
    let result = tokio::task::spawn_blocking(move || {
        let resources = app.graph_resources()?;
        let graph = resources.build(&tokens)?;
        tracing::debug!(
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            "flow graph built"
        );
        Ok::<_, recipe_core::RecipeError>(serde_json::json!({
            "status": "OK",
            "data": graph,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}
