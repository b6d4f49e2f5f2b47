//! Deviation detection engine
//!
//! Walks a played game against the matching repertoire tree and
//! reports the first point where either side left the prepared lines.
//! Every non-analyzable condition degrades to `None`: games outside
//! the repertoire, games that follow book entirely, and games with
//! corrupt notation are all non-events at this layer.

use shakmaty::{san::San, Color, Position};

use super::types::{date_from_epoch, DeviationResult, ResultKind};
use crate::game::PlayedGame;
use crate::repertoire::{Repertoire, RepertoireNode};
use crate::{fingerprint, starting_position};

const UNKNOWN_OPENING: &str = "Unknown";
const MAX_LISTED_VARIATIONS: usize = 5;

/// Analyzes games against a completed repertoire.
///
/// The repertoire is read-only here, so one analyzer can serve
/// concurrent `analyze_game` calls without coordination.
pub struct DeviationAnalyzer {
    repertoire: Repertoire,
}

impl DeviationAnalyzer {
    pub fn new(repertoire: Repertoire) -> Self {
        Self { repertoire }
    }

    pub fn repertoire(&self) -> &Repertoire {
        &self.repertoire
    }

    /// Find the first deviation (or opponent-left-book point) in a
    /// game, if any.
    ///
    /// Returns `None` when the game has no moves, does not start
    /// inside the repertoire, follows book for its whole length, or
    /// carries notation that fails to replay.
    pub fn analyze_game(&self, game: &PlayedGame, username: &str) -> Option<DeviationResult> {
        if game.moves.is_empty() {
            return None;
        }

        let user_color = if game.white.eq_ignore_ascii_case(username) {
            Color::White
        } else {
            Color::Black
        };

        let mut cursor = self.repertoire.tree_for(user_color);

        // Games that do not open inside the repertoire are out of
        // scope, not instant deviations.
        if !cursor.children.contains_key(&game.moves[0]) {
            return None;
        }

        let mut pos = starting_position();

        for (ply, san_text) in game.moves.iter().enumerate() {
            let is_white_move = ply % 2 == 0;
            let is_user_move = is_white_move == (user_color == Color::White);
            let move_number = (ply / 2 + 1) as u32;

            let Some(child) = cursor.children.get(san_text) else {
                return self.divergence(game, cursor, &pos, san_text, move_number, user_color, is_user_move);
            };

            cursor = child;
            let mv = san_text
                .parse::<San>()
                .ok()
                .and_then(|san| san.to_move(&pos).ok())?;
            pos = pos.play(mv).ok()?;
        }

        // Followed book entirely, or the book outlasted the game.
        None
    }

    #[allow(clippy::too_many_arguments)]
    fn divergence(
        &self,
        game: &PlayedGame,
        cursor: &RepertoireNode,
        pos: &shakmaty::Chess,
        played: &str,
        move_number: u32,
        user_color: Color,
        is_user_move: bool,
    ) -> Option<DeviationResult> {
        let mut result = DeviationResult {
            game_url: game.url.clone(),
            opening_name: cursor
                .opening_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_OPENING.to_string()),
            result_kind: ResultKind::OpponentLeftBook,
            move_number,
            user_color,
            game_date: game.end_time.and_then(date_from_epoch),
            study_name: cursor.study_name.clone(),
            your_move: None,
            correct_move: None,
            opponent_move: None,
            fen: Some(fingerprint(pos)),
            variation_count: None,
        };

        if is_user_move {
            // The descent invariant guarantees prepared options exist
            // here; bail out quietly if the tree says otherwise.
            let (correct_move, variation_count) = summarize_options(cursor)?;
            result.result_kind = ResultKind::Deviation;
            result.your_move = Some(played.to_string());
            result.correct_move = Some(correct_move);
            result.variation_count = variation_count;
        } else {
            result.opponent_move = Some(played.to_string());
        }

        Some(result)
    }
}

/// Render what the user should have played: the single prepared move,
/// or a summary when several branches were available.
fn summarize_options(node: &RepertoireNode) -> Option<(String, Option<usize>)> {
    let count = node.children.len();
    match count {
        0 => None,
        1 => Some((node.children.keys().next()?.clone(), None)),
        _ => {
            let shown = (1..=count.min(MAX_LISTED_VARIATIONS))
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let ellipsis = if count > MAX_LISTED_VARIATIONS { "..." } else { "" };
            Some((
                format!("Multiple variations ({}{})", shown, ellipsis),
                Some(count),
            ))
        }
    }
}
