//! Chess.com public API wire types

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveList {
    #[serde(default)]
    pub archives: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyGames {
    #[serde(default)]
    pub games: Vec<ArchivedGame>,
}

/// One game as it appears in a monthly archive.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchivedGame {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub pgn: Option<String>,
    #[serde(default)]
    pub time_class: String,
    #[serde(default)]
    pub time_control: String,
    #[serde(default)]
    pub rated: bool,
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub white: ArchivedPlayer,
    #[serde(default)]
    pub black: ArchivedPlayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchivedPlayer {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub rating: Option<u16>,
    #[serde(default)]
    pub result: String,
}
