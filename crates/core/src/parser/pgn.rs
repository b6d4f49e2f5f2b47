//! Played-game PGN parsing
//!
//! Extracts the mainline of each game in a PGN export, re-rendering
//! every move in canonical SAN against the reconstructed position so
//! that the move strings match the repertoire tree keys exactly.

use pgn_reader::{RawTag, SanPlus, Skip, Visitor};
use shakmaty::{san::San, Chess, Position};
use std::io::Cursor;
use std::ops::ControlFlow;

/// A parsed game: headers plus the mainline in canonical SAN.
#[derive(Debug, Clone)]
pub struct ParsedGame {
    pub white: Option<String>,
    pub black: Option<String>,
    pub date: Option<String>,
    pub result: Option<String>,
    pub eco_url: Option<String>,
    pub moves: Vec<String>,
}

impl ParsedGame {
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }
}

#[derive(Default)]
struct GameTags {
    white: Option<String>,
    black: Option<String>,
    date: Option<String>,
    result: Option<String>,
    eco_url: Option<String>,
}

struct GameMoves {
    tags: GameTags,
    moves: Vec<String>,
    position: Chess,
    success: bool,
}

struct GameParser;

impl Visitor for GameParser {
    type Tags = GameTags;
    type Movetext = GameMoves;
    type Output = Option<ParsedGame>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let value_str = value.decode_utf8_lossy().to_string();

        match name {
            b"White" => tags.white = Some(value_str),
            b"Black" => tags.black = Some(value_str),
            b"Date" | b"UTCDate" => {
                if tags.date.is_none() {
                    tags.date = Some(value_str);
                }
            }
            b"Result" => tags.result = Some(value_str),
            b"ECOUrl" => tags.eco_url = Some(value_str),
            _ => {}
        }

        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(GameMoves {
            tags,
            moves: Vec::new(),
            position: Chess::default(),
            success: true,
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        if !movetext.success {
            return ControlFlow::Continue(());
        }

        match san.san.to_move(&movetext.position) {
            Ok(m) => {
                // Key by the canonical rendering, not the source text:
                // annotators may over-disambiguate ("Ngf3" for "Nf3").
                movetext.moves.push(San::from_move(&movetext.position, m).to_string());
                match movetext.position.clone().play(m) {
                    Ok(new_pos) => {
                        movetext.position = new_pos;
                    }
                    Err(_) => {
                        movetext.success = false;
                    }
                }
            }
            Err(_) => {
                movetext.success = false;
            }
        }

        ControlFlow::Continue(())
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        if movetext.success {
            Some(ParsedGame {
                white: movetext.tags.white,
                black: movetext.tags.black,
                date: movetext.tags.date,
                result: movetext.tags.result,
                eco_url: movetext.tags.eco_url,
                moves: movetext.moves,
            })
        } else {
            None
        }
    }
}

/// Parse every game in a PGN export. Best-effort: games with corrupt
/// movetext are dropped, a truncated document yields the games read
/// so far.
pub fn parse_games(pgn: &str) -> Vec<ParsedGame> {
    let mut parser = GameParser;
    let mut games: Vec<ParsedGame> = Vec::new();

    let cursor = Cursor::new(pgn.as_bytes());
    let mut reader = pgn_reader::Reader::new(cursor);

    loop {
        match reader.read_game(&mut parser) {
            Ok(Some(maybe_game)) => {
                if let Some(game) = maybe_game {
                    games.push(game);
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("stopping PGN read: {}", e);
                break;
            }
        }
    }

    games
}

/// Parse the first game of a PGN string, if any.
pub fn parse_game(pgn: &str) -> Option<ParsedGame> {
    parse_games(pgn).into_iter().next()
}
