//! PGN parsing: played games (mainline) and studies (variation trees)

pub mod pgn;
pub mod study;

pub use pgn::{parse_game, parse_games, ParsedGame};
pub use study::{parse_study, Chapter, MoveNode};
