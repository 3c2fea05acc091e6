use axum::extract::State;
use axum::Json;

use recipe_core::difficulty::{self, ActionCategories, ReferenceTable};
use recipe_core::recipe_time;
use recipe_core::token::NerText;

use super::DataBody;
use crate::error::AppError;
use crate::state::AppState;

/// POST /ner: run the tagger over raw recipe text.
pub async fn ner(
    State(app): State<AppState>,
    Json(body): Json<DataBody<String>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let tagger = app.tagger.clone();
    let text = body.data;
    tracing::debug!(chars = text.chars().count(), "tagging request");
    let result = tokio::task::spawn_blocking(move || {
        let output = tagger.tag(&text)?;
        Ok::<_, recipe_core::RecipeError>(serde_json::json!({
            "status": "OK",
            "data": output.annotated(),
            "wakati": output.wakati,
            "tokens": output.tokens,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

/// POST /time: estimate cooking time from tagged text and its segmentation.
pub async fn time(
    State(app): State<AppState>,
    Json(body): Json<DataBody<(NerText, String)>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.action_times();
    let (ner_text, wakati) = body.data;
    let result = tokio::task::spawn_blocking(move || {
        let table = store.read()?;
        let tokens = ner_text.into_tokens()?;
        let estimate = recipe_time::estimate(&tokens, &wakati, &table);
        Ok::<_, recipe_core::RecipeError>(serde_json::json!({
            "status": "OK",
            "count": estimate.count,
            "time": estimate.time,
            "recipetime": estimate.recipetime,
            "actiontime": estimate.actiontime,
            "params": estimate.params,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

/// POST /level: score recipe difficulty on five axes.
pub async fn level(
    State(app): State<AppState>,
    Json(body): Json<DataBody<(String, String)>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let paths = app.paths.clone();
    let (ingredients, wakati) = body.data;
    let result = tokio::task::spawn_blocking(move || {
        let categories = ActionCategories::load(&paths.action_category)?;
        let reference = ReferenceTable::load(&paths.reference)?;
        let records = difficulty::evaluate(&ingredients, &wakati, &categories, &reference)?;
        Ok::<_, recipe_core::RecipeError>(serde_json::json!({
            "status": "OK",
            "data": records,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}
