//! Played-game record consumed by the deviation analyzer

use serde::{Deserialize, Serialize};

/// A single played game as delivered by a game-archive client.
///
/// `moves` holds canonical SAN, one entry per half-move, in the same
/// notation convention the repertoire trees are keyed by.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayedGame {
    pub url: String,
    pub white: String,
    pub black: String,
    pub moves: Vec<String>,
    /// Game end time as epoch seconds, when the archive provides one.
    #[serde(default)]
    pub end_time: Option<i64>,
    /// Opening name derived from archive metadata. Used only as a
    /// pre-filter hint, never for analysis.
    #[serde(default)]
    pub opening_hint: Option<String>,
    #[serde(default)]
    pub time_class: String,
    #[serde(default)]
    pub time_control: String,
    #[serde(default)]
    pub rated: bool,
    #[serde(default)]
    pub white_rating: Option<u16>,
    #[serde(default)]
    pub black_rating: Option<u16>,
    #[serde(default)]
    pub result: String,
}
