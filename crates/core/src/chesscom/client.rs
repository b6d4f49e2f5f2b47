//! Chess.com public API client

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use shakmaty::Color;
use std::time::Duration;

use super::types::*;
use crate::error::{Error, Result};
use crate::filter::matches_opening_filters;
use crate::game::PlayedGame;
use crate::parser::pgn::parse_game;

const CHESS_COM_BASE: &str = "https://api.chess.com/pub";
const CLIENT_USER_AGENT: &str = "OpeningDeviationAnalyzer/1.0";

/// Filters for a month-range game fetch.
#[derive(Debug, Clone, Default)]
pub struct RangeQuery {
    pub from_year: i32,
    pub from_month: u32,
    pub to_year: i32,
    pub to_month: u32,
    pub time_classes: Vec<String>,
    pub rated: Option<bool>,
    pub color: Option<Color>,
    pub opening_filters: Vec<String>,
}

impl RangeQuery {
    pub fn new(from_year: i32, from_month: u32, to_year: i32, to_month: u32) -> Self {
        Self {
            from_year,
            from_month,
            to_year,
            to_month,
            ..Self::default()
        }
    }

    pub fn time_classes(mut self, classes: Vec<String>) -> Self {
        self.time_classes = classes;
        self
    }

    pub fn rated(mut self, rated: bool) -> Self {
        self.rated = Some(rated);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn opening_filters(mut self, filters: Vec<String>) -> Self {
        self.opening_filters = filters;
        self
    }

    fn months(&self) -> Vec<(i32, u32)> {
        let mut months = Vec::new();
        let (mut year, mut month) = (self.from_year, self.from_month);
        while (year, month) <= (self.to_year, self.to_month) {
            months.push((year, month));
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        months
    }
}

pub struct ChessComClient {
    client: Client,
}

impl ChessComClient {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// List the monthly archive URLs available for a player.
    pub async fn get_archives(&self, username: &str) -> Result<Vec<String>> {
        let url = format!("{}/player/{}/games/archives", CHESS_COM_BASE, username);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::ChessCom(format!(
                "archive list failed: {}",
                response.status()
            )));
        }

        let list: ArchiveList = response.json().await?;
        Ok(list.archives)
    }

    /// Fetch one month of games, optionally filtered by time class and
    /// rated flag. Games whose PGN cannot be parsed are dropped.
    pub async fn get_games(
        &self,
        username: &str,
        year: i32,
        month: u32,
        time_class: Option<&str>,
        rated: Option<bool>,
    ) -> Result<Vec<PlayedGame>> {
        let url = format!(
            "{}/player/{}/games/{}/{:02}",
            CHESS_COM_BASE, username, year, month
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::ChessCom(format!(
                "games for {}/{:02} failed: {}",
                year,
                month,
                response.status()
            )));
        }

        let monthly: MonthlyGames = response.json().await?;
        let games = monthly
            .games
            .into_iter()
            .filter(|g| time_class.map_or(true, |tc| g.time_class == tc))
            .filter(|g| rated.map_or(true, |r| g.rated == r))
            .filter_map(played_game_from_archive)
            .collect();

        Ok(games)
    }

    /// Fetch games across a month range and apply the query's filters,
    /// including the keyword opening pre-filter.
    ///
    /// Returns the matching games and the total number of games that
    /// passed the time-class/rated/color filters, so callers can report
    /// how much the opening filter narrowed the set.
    pub async fn get_games_for_range(
        &self,
        username: &str,
        query: &RangeQuery,
    ) -> Result<(Vec<PlayedGame>, usize)> {
        let mut games = Vec::new();
        let mut total = 0usize;

        for (year, month) in query.months() {
            let monthly = self.get_games(username, year, month, None, query.rated).await?;

            for game in monthly {
                if !query.time_classes.is_empty()
                    && !query.time_classes.contains(&game.time_class)
                {
                    continue;
                }
                if let Some(color) = query.color {
                    if user_color(&game, username) != Some(color) {
                        continue;
                    }
                }
                total += 1;
                if game_matches_opening(&game, &query.opening_filters) {
                    games.push(game);
                }
            }
        }

        tracing::debug!(
            total,
            matched = games.len(),
            "fetched games for {}..{} months",
            query.from_month,
            query.to_month
        );

        Ok((games, total))
    }
}

fn user_color(game: &PlayedGame, username: &str) -> Option<Color> {
    if game.white.eq_ignore_ascii_case(username) {
        Some(Color::White)
    } else if game.black.eq_ignore_ascii_case(username) {
        Some(Color::Black)
    } else {
        None
    }
}

/// The opening pre-filter is best-effort: games without a derived
/// opening hint are kept rather than excluded.
fn game_matches_opening(game: &PlayedGame, filters: &[String]) -> bool {
    match &game.opening_hint {
        Some(opening) => matches_opening_filters(filters, opening),
        None => true,
    }
}

/// Convert an archived game to the analyzer's input shape, parsing the
/// PGN for the mainline and the opening hint. Unparseable games yield
/// `None`.
fn played_game_from_archive(game: ArchivedGame) -> Option<PlayedGame> {
    let parsed = parse_game(game.pgn.as_deref()?)?;

    Some(PlayedGame {
        url: game.url,
        white: game.white.username,
        black: game.black.username,
        moves: parsed.moves,
        end_time: game.end_time,
        opening_hint: parsed.eco_url.as_deref().and_then(opening_from_eco_url),
        time_class: game.time_class,
        time_control: game.time_control,
        rated: game.rated,
        white_rating: game.white.rating,
        black_rating: game.black.rating,
        result: game.white.result,
    })
}

/// Derive a readable opening name from a chess.com `ECOUrl` header:
/// the last path segment with hyphens turned into spaces.
fn opening_from_eco_url(url: &str) -> Option<String> {
    let segment = url.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    Some(segment.replace('-', " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_name_from_eco_url() {
        assert_eq!(
            opening_from_eco_url("https://www.chess.com/openings/Sicilian-Defense-Open").as_deref(),
            Some("Sicilian Defense Open")
        );
        assert_eq!(
            opening_from_eco_url("https://www.chess.com/openings/Italian-Game/").as_deref(),
            Some("Italian Game")
        );
        assert_eq!(opening_from_eco_url(""), None);
    }

    #[test]
    fn archive_conversion_parses_moves_and_hint() {
        let game = ArchivedGame {
            url: "https://www.chess.com/game/live/1".to_string(),
            pgn: Some(
                r#"[ECOUrl "https://www.chess.com/openings/Kings-Pawn-Opening"]

1. e4 e5 2. Nf3 *
"#
                .to_string(),
            ),
            time_class: "blitz".to_string(),
            time_control: "300".to_string(),
            rated: true,
            end_time: Some(1700000000),
            white: ArchivedPlayer {
                username: "alice".to_string(),
                rating: Some(1500),
                result: "win".to_string(),
            },
            black: ArchivedPlayer {
                username: "bob".to_string(),
                rating: Some(1480),
                result: "resigned".to_string(),
            },
        };

        let played = played_game_from_archive(game).unwrap();
        assert_eq!(played.moves, vec!["e4", "e5", "Nf3"]);
        assert_eq!(played.opening_hint.as_deref(), Some("Kings Pawn Opening"));
        assert_eq!(played.white, "alice");
        assert_eq!(played.result, "win");
    }

    #[test]
    fn games_without_pgn_are_dropped() {
        let game = ArchivedGame {
            url: String::new(),
            pgn: None,
            time_class: String::new(),
            time_control: String::new(),
            rated: false,
            end_time: None,
            white: ArchivedPlayer::default(),
            black: ArchivedPlayer::default(),
        };
        assert!(played_game_from_archive(game).is_none());
    }

    #[test]
    fn month_range_spans_year_boundary() {
        let query = RangeQuery::new(2025, 11, 2026, 2);
        assert_eq!(
            query.months(),
            vec![(2025, 11), (2025, 12), (2026, 1), (2026, 2)]
        );

        let single = RangeQuery::new(2026, 3, 2026, 3);
        assert_eq!(single.months(), vec![(2026, 3)]);

        let inverted = RangeQuery::new(2026, 5, 2026, 3);
        assert!(inverted.months().is_empty());
    }

    #[test]
    fn hintless_games_pass_the_opening_filter() {
        let game = PlayedGame {
            url: String::new(),
            white: "a".to_string(),
            black: "b".to_string(),
            moves: vec![],
            end_time: None,
            opening_hint: None,
            time_class: String::new(),
            time_control: String::new(),
            rated: false,
            white_rating: None,
            black_rating: None,
            result: String::new(),
        };
        assert!(game_matches_opening(&game, &["Sicilian".to_string()]));

        let mut hinted = game.clone();
        hinted.opening_hint = Some("French Defense".to_string());
        assert!(!game_matches_opening(&hinted, &["Sicilian".to_string()]));
        assert!(game_matches_opening(&hinted, &[]));
    }
}
