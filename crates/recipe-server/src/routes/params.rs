use axum::extract::State;
use axum::Json;

use recipe_core::action_time::ActionTimeRecord;

use super::DataBody;
use crate::error::AppError;
use crate::state::AppState;

/// POST /attachac: replace the action-time table with the posted records.
pub async fn attach_action_times(
    State(app): State<AppState>,
    Json(body): Json<DataBody<Vec<ActionTimeRecord>>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.action_times();
    let records = body.data;
    tokio::task::spawn_blocking(move || store.overwrite(records))
        .await
        .map_err(AppError::join)??;

    Ok(Json(serde_json::json!({ "status": "OK" })))
}

/// POST /resetparams: restore the action-time table from its master copy.
pub async fn reset_params(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.action_times();
    tokio::task::spawn_blocking(move || store.reset())
        .await
        .map_err(AppError::join)??;

    Ok(Json(serde_json::json!({ "status": "OK" })))
}
