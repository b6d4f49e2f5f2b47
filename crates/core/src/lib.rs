//! Opening Deviation Analyzer Core Library
//!
//! Builds repertoire trees from study documents and reports where
//! played games first depart from them.

use shakmaty::{fen::Fen, Chess, EnPassantMode};

pub use shakmaty::Color;

pub mod analyzer;
pub mod chesscom;
pub mod error;
pub mod filter;
pub mod game;
pub mod lichess;
pub mod parser;
pub mod repertoire;

pub use analyzer::{DeviationAnalyzer, DeviationResult, ResultKind};
pub use chesscom::{ChessComClient, RangeQuery};
pub use error::{Error, Result};
pub use game::PlayedGame;
pub use lichess::LichessClient;
pub use repertoire::{Repertoire, RepertoireBuilder, RepertoireNode};

/// Creates the standard starting position
pub fn starting_position() -> Chess {
    Chess::default()
}

/// Canonical fingerprint of a position: FEN truncated to board, side
/// to move, castling rights and en-passant square. Move counters are
/// dropped so positions reached by different move orders share a
/// fingerprint.
pub fn fingerprint(position: &Chess) -> String {
    let fen = Fen::from_position(position, EnPassantMode::Legal).to_string();
    fen.split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{san::San, Position};

    #[test]
    fn transpositions_share_a_fingerprint() {
        let play = |moves: &[&str]| {
            let mut pos = starting_position();
            for san in moves {
                let mv = san.parse::<San>().unwrap().to_move(&pos).unwrap();
                pos = pos.play(mv).unwrap();
            }
            pos
        };

        let via_nf3 = play(&["Nf3", "d5", "d4"]);
        let via_d4 = play(&["d4", "d5", "Nf3"]);
        assert_eq!(fingerprint(&via_nf3), fingerprint(&via_d4));
        assert_ne!(fingerprint(&via_nf3), fingerprint(&starting_position()));
    }
}
