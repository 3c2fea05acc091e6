use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use recipe_core::error::RecipeError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub(crate) fn join(err: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {err}"))
    }
}

fn status_for(err: &RecipeError) -> StatusCode {
    match err {
        RecipeError::InvalidPathSegment(_)
        | RecipeError::MalformedIngredient(_)
        | RecipeError::InvalidRecord(_) => StatusCode::BAD_REQUEST,
        RecipeError::NotFound(_) => StatusCode::NOT_FOUND,
        RecipeError::TaggerNotFound(_) => StatusCode::SERVICE_UNAVAILABLE,
        RecipeError::Tagging(_) => StatusCode::BAD_GATEWAY,
        RecipeError::MissingCategory(_)
        | RecipeError::MissingCategoryCode(_)
        | RecipeError::UnknownVocabulary(_)
        | RecipeError::MalformedArtifact { .. }
        | RecipeError::InvalidReference(_)
        | RecipeError::MissingActionCategory(_)
        | RecipeError::Io(_)
        | RecipeError::Yaml(_)
        | RecipeError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self
            .0
            .downcast_ref::<RecipeError>()
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn status(err: RecipeError) -> StatusCode {
        AppError(err.into()).into_response().status()
    }

    #[test]
    fn invalid_segment_maps_to_400() {
        assert_eq!(
            status(RecipeError::InvalidPathSegment("..".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn malformed_ingredient_maps_to_400() {
        assert_eq!(
            status(RecipeError::MalformedIngredient("flour".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            status(RecipeError::NotFound("x.json".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn missing_tagger_maps_to_503() {
        assert_eq!(
            status(RecipeError::TaggerNotFound("kytea".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn tagging_failure_maps_to_502() {
        assert_eq!(
            status(RecipeError::Tagging("exit 1".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn unknown_vocabulary_maps_to_500() {
        assert_eq!(
            status(RecipeError::UnknownVocabulary("人参".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn non_recipe_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_record_maps_to_400() {
        assert_eq!(
            status(RecipeError::InvalidRecord("missing data".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn response_body_is_json() {
        let response = AppError(RecipeError::NotFound("x".into()).into()).into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
