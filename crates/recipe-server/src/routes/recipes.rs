use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::DataBody;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadRequest {
    pub selected_data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub selected_recipe_data_type: String,
    pub selected_recipe_data_type_file: String,
}

/// POST /select: list the source folders under the import directory.
pub async fn select(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.recipes();
    let result = tokio::task::spawn_blocking(move || {
        let sources = store.list_sources()?;
        Ok::<_, recipe_core::RecipeError>(serde_json::json!({
            "status": "OK",
            "data": sources,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

/// POST /read: return an exported result file.
pub async fn read(
    State(app): State<AppState>,
    Json(body): Json<DataBody<ReadRequest>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.recipes();
    let file = body.data.selected_data;
    let result = tokio::task::spawn_blocking(move || {
        let data = store.read_export(&file)?;
        Ok::<_, recipe_core::RecipeError>(serde_json::json!({
            "status": "OK",
            "data": data,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

/// POST /filelist: list the records of one source folder.
pub async fn filelist(
    State(app): State<AppState>,
    Json(body): Json<DataBody<String>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.recipes();
    let source = body.data;
    let result = tokio::task::spawn_blocking(move || {
        let files = store.list_source(&source)?;
        Ok::<_, recipe_core::RecipeError>(serde_json::json!({
            "status": "OK",
            "data": files,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

/// POST /import: load one imported recipe record.
pub async fn import(
    State(app): State<AppState>,
    Json(body): Json<DataBody<ImportRequest>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.recipes();
    let ImportRequest {
        selected_recipe_data_type: source,
        selected_recipe_data_type_file: file,
    } = body.data;
    let result = tokio::task::spawn_blocking(move || {
        let data = store.read_import(&source, &file)?;
        Ok::<_, recipe_core::RecipeError>(serde_json::json!({
            "status": "OK",
            "data": data,
        }))
    })
    .await
    .map_err(AppError::join)??;

    Ok(Json(result))
}

/// POST /output: persist a recipe record under its source folder.
pub async fn output(
    State(app): State<AppState>,
    Json(body): Json<DataBody<serde_json::Value>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = app.recipes();
    let record = body.data;
    tokio::task::spawn_blocking(move || store.export(record))
        .await
        .map_err(AppError::join)??;

    Ok(Json(serde_json::json!({ "status": "OK" })))
}
