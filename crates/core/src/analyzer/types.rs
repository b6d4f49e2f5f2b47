//! Deviation result types

use serde::ser::{Serialize, SerializeStruct, Serializer};
use shakmaty::Color;

const ANALYSIS_URL_BASE: &str = "https://lichess.org/analysis";

/// What kind of first divergence was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// The user played a move outside their repertoire.
    Deviation,
    /// The opponent left the prepared lines first.
    OpponentLeftBook,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Deviation => "deviation",
            ResultKind::OpponentLeftBook => "opponent_left_book",
        }
    }
}

/// One finding for one played game. Constructed once by the analyzer,
/// then serialized; never mutated.
#[derive(Debug, Clone)]
pub struct DeviationResult {
    pub game_url: String,
    pub opening_name: String,
    pub result_kind: ResultKind,
    /// 1-based full-move number of the diverging move.
    pub move_number: u32,
    pub user_color: Color,
    pub game_date: Option<String>,
    pub study_name: Option<String>,
    /// What the user played (deviations only).
    pub your_move: Option<String>,
    /// What the repertoire prepared (deviations only). Either a single
    /// move or a "Multiple variations (...)" summary.
    pub correct_move: Option<String>,
    /// What the opponent played (opponent-left-book only).
    pub opponent_move: Option<String>,
    /// Fingerprint of the position before the diverging move.
    pub fen: Option<String>,
    /// How many prepared branches the user could have chosen from.
    pub variation_count: Option<usize>,
}

impl DeviationResult {
    pub fn user_color_name(&self) -> &'static str {
        match self.user_color {
            Color::White => "white",
            Color::Black => "black",
        }
    }

    /// Board-analysis link for the diverging position. Derived, not
    /// stored; absent when no fingerprint exists.
    pub fn analysis_url(&self) -> Option<String> {
        self.fen
            .as_ref()
            .map(|fen| format!("{}/{}", ANALYSIS_URL_BASE, fen.replace(' ', "_")))
    }
}

impl Serialize for DeviationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DeviationResult", 13)?;
        state.serialize_field("game_url", &self.game_url)?;
        state.serialize_field("opening_name", &self.opening_name)?;
        state.serialize_field("result_type", self.result_kind.as_str())?;
        state.serialize_field("move_number", &self.move_number)?;
        state.serialize_field("user_color", self.user_color_name())?;
        state.serialize_field("game_date", &self.game_date)?;
        state.serialize_field("study_name", &self.study_name)?;
        state.serialize_field("your_move", &self.your_move)?;
        state.serialize_field("correct_move", &self.correct_move)?;
        state.serialize_field("opponent_move", &self.opponent_move)?;
        state.serialize_field("fen", &self.fen)?;
        state.serialize_field("variation_count", &self.variation_count)?;
        state.serialize_field("analysis_url", &self.analysis_url())?;
        state.end()
    }
}

/// Convert an epoch-seconds timestamp to a `YYYY-MM-DD` date string.
/// Out-of-range timestamps yield `None` rather than an error.
pub fn date_from_epoch(secs: i64) -> Option<String> {
    chrono::DateTime::from_timestamp(secs, 0).map(|date| date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeviationResult {
        DeviationResult {
            game_url: "https://example.com/game/1".to_string(),
            opening_name: "Italian Game".to_string(),
            result_kind: ResultKind::Deviation,
            move_number: 3,
            user_color: Color::White,
            game_date: Some("2026-01-15".to_string()),
            study_name: Some("White Openings - Italian".to_string()),
            your_move: Some("Bb5".to_string()),
            correct_move: Some("Bc4".to_string()),
            opponent_move: None,
            fen: Some("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -".to_string()),
            variation_count: None,
        }
    }

    #[test]
    fn serializes_kind_and_color_as_strings() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["result_type"], "deviation");
        assert_eq!(json["user_color"], "white");
        assert_eq!(json["move_number"], 3);
        assert_eq!(json["opponent_move"], serde_json::Value::Null);
    }

    #[test]
    fn analysis_url_replaces_spaces() {
        let json = serde_json::to_value(sample()).unwrap();
        let url = json["analysis_url"].as_str().unwrap();
        assert!(url.starts_with("https://lichess.org/analysis/"));
        assert!(!url.contains(' '));
        assert!(url.contains("RNBQKBNR_w_KQkq"));
    }

    #[test]
    fn analysis_url_absent_without_fen() {
        let mut result = sample();
        result.fen = None;
        assert!(result.analysis_url().is_none());
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["analysis_url"], serde_json::Value::Null);
    }

    #[test]
    fn epoch_converts_to_calendar_date() {
        assert_eq!(date_from_epoch(1700000000).as_deref(), Some("2023-11-14"));
        assert_eq!(date_from_epoch(0).as_deref(), Some("1970-01-01"));
    }

    #[test]
    fn out_of_range_epoch_yields_none() {
        assert_eq!(date_from_epoch(i64::MAX), None);
        assert_eq!(date_from_epoch(i64::MIN), None);
    }
}
