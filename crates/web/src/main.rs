use axum::{
    routing::{get, post},
    Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

mod pkce;
mod routes;

pub struct Config {
    pub lichess_client_id: String,
    pub redirect_uri: String,
}

pub struct AppState {
    pub config: Config,
    /// PKCE state -> code verifier, owned by the app rather than
    /// living in a global.
    pub pkce_store: Mutex<HashMap<String, String>>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config {
        lichess_client_id: std::env::var("LICHESS_CLIENT_ID")
            .unwrap_or_else(|_| "opening-deviation-analyzer".to_string()),
        redirect_uri: std::env::var("REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:5173/callback".to_string()),
    };

    let state = Arc::new(AppState {
        config,
        pkce_store: Mutex::new(HashMap::new()),
    });

    let mut app = Router::new()
        .route("/api/auth/lichess", get(routes::lichess_auth))
        .route("/api/auth/callback", post(routes::lichess_callback))
        .route("/api/lichess/me", get(routes::lichess_me))
        .route("/api/lichess/studies", get(routes::lichess_studies))
        .route("/api/lichess/study/:study_id", get(routes::study_pgn))
        .route(
            "/api/chess-com/archives/:username",
            get(routes::chess_com_archives),
        )
        .route("/api/chess-com/games/:username", get(routes::chess_com_games))
        .route("/api/analyze", post(routes::analyze::analyze_games))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Serve the frontend build in production deployments.
    if std::path::Path::new("static").exists() {
        app = app.fallback_service(ServeDir::new("static"));
    }

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    tracing::info!("server running at http://{}", addr);

    axum::serve(listener, app).await.unwrap();
}
