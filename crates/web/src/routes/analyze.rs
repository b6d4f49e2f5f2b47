//! The analysis pipeline: studies -> repertoire -> games -> deviations

use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use opening_deviation_core::{
    ChessComClient, Color, DeviationAnalyzer, LichessClient, RangeQuery, RepertoireBuilder,
};

use super::{bearer_token, ApiError};
use crate::AppState;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub study_ids: Vec<String>,
    pub chess_com_username: String,
    pub from_year: i32,
    pub from_month: u32,
    pub to_year: i32,
    pub to_month: u32,
    #[serde(default)]
    pub time_classes: Vec<String>,
    #[serde(default)]
    pub rated: Option<bool>,
    /// "white", "black", or absent for both.
    #[serde(default)]
    pub color: Option<String>,
    /// Overrides the study names used for opening pre-filtering.
    #[serde(default)]
    pub study_names: Vec<String>,
}

pub async fn analyze_games(
    State(_state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lichess = LichessClient::with_token(bearer_token(&headers)?)?;
    let account = lichess.get_account().await?;
    let studies = lichess.get_user_studies(&account.username).await?;

    // Build the repertoire from the selected studies.
    let mut builder = RepertoireBuilder::new();
    let mut collected_names = Vec::new();

    for study_id in &request.study_ids {
        let pgn = lichess.get_study_pgn(study_id).await?;
        let name = studies
            .iter()
            .find(|study| &study.id == study_id)
            .map(|study| study.name.clone())
            .unwrap_or_else(|| "Unknown Opening".to_string());
        collected_names.push(name.clone());
        builder.add_study(pgn, name.clone(), name);
    }

    let repertoire = builder.build();
    tracing::info!(
        studies = request.study_ids.len(),
        positions = repertoire.indexed_positions(),
        "repertoire built"
    );

    let opening_filters = if request.study_names.is_empty() {
        collected_names
    } else {
        request.study_names.clone()
    };

    let mut query = RangeQuery::new(
        request.from_year,
        request.from_month,
        request.to_year,
        request.to_month,
    )
    .time_classes(request.time_classes.clone())
    .opening_filters(opening_filters);

    if let Some(rated) = request.rated {
        query = query.rated(rated);
    }
    match request.color.as_deref() {
        Some("white") => query = query.color(Color::White),
        Some("black") => query = query.color(Color::Black),
        _ => {}
    }

    let chess_com = ChessComClient::new()?;
    let (games, total_games) = chess_com
        .get_games_for_range(&request.chess_com_username, &query)
        .await?;
    let filtered_by_opening = games.len();

    let analyzer = DeviationAnalyzer::new(repertoire);
    let mut results = Vec::new();

    for game in &games {
        if let Some(result) = analyzer.analyze_game(game, &request.chess_com_username) {
            let mut value =
                serde_json::to_value(&result).map_err(opening_deviation_core::Error::from)?;
            value["chess_com_opening"] = json!(game.opening_hint.clone().unwrap_or_default());
            results.push(value);
        }
    }
    let analyzed_with_deviations = results.len();

    Ok(Json(json!({
        "results": results,
        "total_games": total_games,
        "filtered_by_opening": filtered_by_opening,
        "analyzed_with_deviations": analyzed_with_deviations,
    })))
}
