pub mod error;
pub mod routes;
pub mod state;

use std::path::PathBuf;

use axum::routing::{get, post};
use axum::Router;
use recipe_core::config::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Front-end bundle; unknown paths get index.html so client-side routes resolve.
    let static_dir = app_state.paths.static_dir.clone();
    let frontend = ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(routes::health::health))
        // Analysis
        .route("/ner", post(routes::analysis::ner))
        .route("/time", post(routes::analysis::time))
        .route("/level", post(routes::analysis::level))
        .route("/flowgraph", post(routes::flowgraph::flowgraph))
        // Recipe records
        .route("/select", post(routes::recipes::select))
        .route("/read", post(routes::recipes::read))
        .route("/filelist", post(routes::recipes::filelist))
        .route("/import", post(routes::recipes::import))
        .route("/output", post(routes::recipes::output))
        // Action-time parameters
        .route("/attachac", post(routes::params::attach_action_times))
        .route("/resetparams", post(routes::params::reset_params))
        .fallback_service(frontend)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the recipe analysis server on `0.0.0.0:<port>`.
pub async fn serve(root: PathBuf, config: &Config, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, config, listener).await
}

/// Start the server on a pre-bound listener.
///
/// The caller can read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    config: &Config,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(state::AppState::new(root, config));

    tracing::info!("recipe server listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
