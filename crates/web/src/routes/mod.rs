use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use opening_deviation_core::{ChessComClient, LichessClient};

use crate::{pkce, AppState};

pub mod analyze;

const LICHESS_OAUTH_URL: &str = "https://lichess.org/oauth";
const LICHESS_STUDY_SCOPE: &str = "study:read";

/// JSON error response: `{"detail": "..."}` plus a status code.
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<opening_deviation_core::Error> for ApiError {
    fn from(err: opening_deviation_core::Error) -> Self {
        tracing::warn!("upstream error: {}", err);
        Self {
            status: StatusCode::BAD_GATEWAY,
            detail: err.to_string(),
        }
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start_matches("Bearer ").to_string())
        .ok_or_else(|| ApiError::unauthorized("missing Authorization header"))
}

/// Start the Lichess OAuth flow: hand the frontend a URL to redirect
/// to, remembering the PKCE verifier under the state nonce.
pub async fn lichess_auth(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let (verifier, challenge) = pkce::generate_pkce();
    let csrf = pkce::random_state();

    state
        .pkce_store
        .lock()
        .unwrap()
        .insert(csrf.clone(), verifier);

    let auth_url = format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&code_challenge_method=S256&code_challenge={}&state={}",
        LICHESS_OAUTH_URL,
        urlencoding::encode(&state.config.lichess_client_id),
        urlencoding::encode(&state.config.redirect_uri),
        urlencoding::encode(LICHESS_STUDY_SCOPE),
        challenge,
        csrf,
    );

    Json(json!({ "auth_url": auth_url, "state": csrf }))
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: String,
}

/// Exchange the authorization code for an access token.
pub async fn lichess_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let verifier = state
        .pkce_store
        .lock()
        .unwrap()
        .remove(&query.state)
        .ok_or_else(|| ApiError::bad_request("Invalid state parameter"))?;

    let client = LichessClient::new()?;
    let token = client
        .exchange_token(
            &query.code,
            &verifier,
            &state.config.redirect_uri,
            &state.config.lichess_client_id,
        )
        .await?;

    Ok(Json(token))
}

pub async fn lichess_me(headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let client = LichessClient::with_token(bearer_token(&headers)?)?;
    Ok(Json(client.get_account().await?))
}

pub async fn lichess_studies(headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let client = LichessClient::with_token(bearer_token(&headers)?)?;
    let account = client.get_account().await?;
    let studies = client.get_user_studies(&account.username).await?;
    Ok(Json(json!({ "studies": studies })))
}

pub async fn study_pgn(
    Path(study_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let client = LichessClient::with_token(bearer_token(&headers)?)?;
    let pgn = client.get_study_pgn(&study_id).await?;
    Ok(Json(json!({ "pgn": pgn })))
}

pub async fn chess_com_archives(
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let client = ChessComClient::new()?;
    let archives = client.get_archives(&username).await?;
    Ok(Json(json!({ "archives": archives })))
}

#[derive(Deserialize)]
pub struct GamesQuery {
    year: i32,
    month: u32,
    time_class: Option<String>,
    rated: Option<bool>,
}

pub async fn chess_com_games(
    Path(username): Path<String>,
    Query(query): Query<GamesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let client = ChessComClient::new()?;
    let games = client
        .get_games(
            &username,
            query.year,
            query.month,
            query.time_class.as_deref(),
            query.rated,
        )
        .await?;
    Ok(Json(json!({ "games": games })))
}

pub async fn health() -> &'static str {
    "OK"
}
