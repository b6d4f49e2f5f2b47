//! Repertoire tree model

use serde::Serialize;
use shakmaty::Color;
use std::collections::HashMap;

/// One position reached after a specific move from its parent.
///
/// `children` keys are canonical SAN strings; a key exists for every
/// move observed at this position across all ingested studies.
#[derive(Debug, Clone, Default)]
pub struct RepertoireNode {
    pub children: HashMap<String, RepertoireNode>,
    pub opening_name: Option<String>,
    pub study_name: Option<String>,
    /// True when the move leading into this position was made by the
    /// color this tree represents.
    pub is_user_turn: bool,
}

impl RepertoireNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// What the position index records for a known position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionEntry {
    pub opening_name: String,
    pub study_name: Option<String>,
    /// Number of prepared moves branching out of this position.
    pub branch_count: usize,
}

/// Complete repertoire: one tree per side the user may be playing,
/// plus a transposition index keyed by position fingerprint.
///
/// Both trees are built from the same studies and are structurally
/// identical; only `is_user_turn` differs between them.
#[derive(Debug, Clone, Default)]
pub struct Repertoire {
    pub white_tree: RepertoireNode,
    pub black_tree: RepertoireNode,
    pub(crate) position_index: HashMap<String, PositionEntry>,
}

impl Repertoire {
    /// The tree for games where the user plays `color`.
    pub fn tree_for(&self, color: Color) -> &RepertoireNode {
        match color {
            Color::White => &self.white_tree,
            Color::Black => &self.black_tree,
        }
    }

    /// Transposition-aware lookup by position fingerprint (FEN).
    pub fn lookup_position(&self, fen: &str) -> Option<&PositionEntry> {
        self.position_index.get(fen)
    }

    pub fn indexed_positions(&self) -> usize {
        self.position_index.len()
    }
}
