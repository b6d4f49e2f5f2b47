//! Repertoire construction from study documents
//!
//! Both trees are populated in one lockstep descent over each chapter's
//! variation tree, replaying moves on a board so children are keyed by
//! canonical SAN. After all studies are in, the position index is built
//! by replaying the white tree from the initial position.

use shakmaty::{san::San, Chess, Color, Position};
use std::collections::HashMap;

use super::tree::{PositionEntry, Repertoire, RepertoireNode};
use crate::parser::study::{parse_study, MoveNode};
use crate::{fingerprint, starting_position};

struct QueuedStudy {
    pgn: String,
    opening_name: String,
    study_name: String,
}

/// Builds a [`Repertoire`] from queued study documents.
///
/// Ingestion is best-effort: unparseable documents contribute zero
/// chapters, unreplayable variations are skipped. Later studies win
/// label conflicts on shared move paths.
#[derive(Default)]
pub struct RepertoireBuilder {
    studies: Vec<QueuedStudy>,
}

impl RepertoireBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a study document for the next `build()`.
    pub fn add_study(
        &mut self,
        pgn: impl Into<String>,
        opening_name: impl Into<String>,
        study_name: impl Into<String>,
    ) {
        self.studies.push(QueuedStudy {
            pgn: pgn.into(),
            opening_name: opening_name.into(),
            study_name: study_name.into(),
        });
    }

    /// Process every queued study into a fresh repertoire.
    ///
    /// The queue is retained, so repeated calls yield equivalent
    /// repertoires.
    pub fn build(&self) -> Repertoire {
        let mut repertoire = Repertoire::default();

        for study in &self.studies {
            let chapters = parse_study(&study.pgn);
            tracing::debug!(
                study = %study.study_name,
                chapters = chapters.len(),
                "ingesting study"
            );

            for chapter in &chapters {
                let study_label = chapter_label(chapter.title.as_deref(), &study.study_name);
                populate(
                    &chapter.root,
                    &mut repertoire.white_tree,
                    &mut repertoire.black_tree,
                    &starting_position(),
                    Color::White,
                    &study.opening_name,
                    &study_label,
                );
            }
        }

        repertoire.position_index = build_index(&repertoire.white_tree);
        repertoire
    }
}

/// Derive the per-chapter study label. Lichess chapter titles look like
/// "Study Name: Chapter 3"; only the part after the separator is kept.
fn chapter_label(title: Option<&str>, study_name: &str) -> String {
    match title {
        Some(title) if !title.trim().is_empty() => {
            let detail = match title.split_once(':') {
                Some((_, detail)) => detail.trim(),
                None => title.trim(),
            };
            if detail.is_empty() {
                study_name.to_string()
            } else {
                format!("{} - {}", study_name, detail)
            }
        }
        _ => study_name.to_string(),
    }
}

/// Insert one chapter subtree into both trees at the given cursors.
///
/// `turn` is the color about to move at `pos`; a child's `is_user_turn`
/// records whether that move belongs to the tree's own color.
fn populate(
    variations: &[MoveNode],
    white: &mut RepertoireNode,
    black: &mut RepertoireNode,
    pos: &Chess,
    turn: Color,
    opening_name: &str,
    study_label: &str,
) {
    for variation in variations {
        let san: San = match variation.san.parse() {
            Ok(san) => san,
            Err(e) => {
                tracing::debug!(san = %variation.san, "unparseable study move: {}", e);
                continue;
            }
        };
        let mv = match san.to_move(pos) {
            Ok(mv) => mv,
            Err(e) => {
                tracing::debug!(san = %variation.san, "illegal study move: {}", e);
                continue;
            }
        };
        let next = match pos.clone().play(mv) {
            Ok(next) => next,
            Err(_) => continue,
        };
        let key = San::from_move(pos, mv).to_string();

        let white_child = white
            .children
            .entry(key.clone())
            .or_insert_with(|| RepertoireNode {
                is_user_turn: turn == Color::White,
                ..RepertoireNode::default()
            });
        white_child.opening_name = Some(opening_name.to_string());
        white_child.study_name = Some(study_label.to_string());

        let black_child = black
            .children
            .entry(key)
            .or_insert_with(|| RepertoireNode {
                is_user_turn: turn == Color::Black,
                ..RepertoireNode::default()
            });
        black_child.opening_name = Some(opening_name.to_string());
        black_child.study_name = Some(study_label.to_string());

        populate(
            &variation.children,
            white_child,
            black_child,
            &next,
            !turn,
            opening_name,
            study_label,
        );
    }
}

fn build_index(white_tree: &RepertoireNode) -> HashMap<String, PositionEntry> {
    let mut index = HashMap::new();
    index_subtree(white_tree, &starting_position(), &mut index);
    index
}

fn index_subtree(
    node: &RepertoireNode,
    pos: &Chess,
    index: &mut HashMap<String, PositionEntry>,
) {
    for (san_text, child) in &node.children {
        let mv = match san_text.parse::<San>().ok().and_then(|s| s.to_move(pos).ok()) {
            Some(mv) => mv,
            None => {
                tracing::debug!(san = %san_text, "skipping unreplayable index subtree");
                continue;
            }
        };
        let next = match pos.clone().play(mv) {
            Ok(next) => next,
            Err(_) => continue,
        };

        if let Some(opening_name) = &child.opening_name {
            index.insert(
                fingerprint(&next),
                PositionEntry {
                    opening_name: opening_name.clone(),
                    study_name: child.study_name.clone(),
                    branch_count: child.children.len(),
                },
            );
        }

        index_subtree(child, &next, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITALIAN: &str = r#"[Event "White Openings: Italian"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 *
"#;

    const SICILIAN_LINES: &str = "1. e4 c5 2. Nf3 (2. Nc3 Nc6) d6 *";

    fn walk<'a>(root: &'a RepertoireNode, path: &[&str]) -> &'a RepertoireNode {
        let mut node = root;
        for san in path {
            node = node
                .children
                .get(*san)
                .unwrap_or_else(|| panic!("missing move {} on path {:?}", san, path));
        }
        node
    }

    fn assert_symmetric(white: &RepertoireNode, black: &RepertoireNode) {
        let mut white_moves: Vec<&String> = white.children.keys().collect();
        let mut black_moves: Vec<&String> = black.children.keys().collect();
        white_moves.sort();
        black_moves.sort();
        assert_eq!(white_moves, black_moves);

        for (san, white_child) in &white.children {
            let black_child = &black.children[san];
            assert_eq!(white_child.is_user_turn, !black_child.is_user_turn);
            assert_eq!(white_child.opening_name, black_child.opening_name);
            assert_eq!(white_child.study_name, black_child.study_name);
            assert_symmetric(white_child, black_child);
        }
    }

    #[test]
    fn builds_mainline_with_turn_flags() {
        let mut builder = RepertoireBuilder::new();
        builder.add_study(ITALIAN, "Italian Game", "White Openings");
        let repertoire = builder.build();

        let e4 = walk(&repertoire.white_tree, &["e4"]);
        assert!(e4.is_user_turn);
        assert_eq!(e4.opening_name.as_deref(), Some("Italian Game"));
        assert_eq!(e4.study_name.as_deref(), Some("White Openings - Italian"));

        let e5 = walk(&repertoire.white_tree, &["e4", "e5"]);
        assert!(!e5.is_user_turn);

        let nf3 = walk(&repertoire.white_tree, &["e4", "e5", "Nf3"]);
        assert!(nf3.is_user_turn);

        // Same structure seen from the black side, flags flipped.
        let black_e4 = walk(&repertoire.black_tree, &["e4"]);
        assert!(!black_e4.is_user_turn);
    }

    #[test]
    fn variations_become_siblings() {
        let mut builder = RepertoireBuilder::new();
        builder.add_study(SICILIAN_LINES, "Sicilian", "Anti-Sicilians");
        let repertoire = builder.build();

        let c5 = walk(&repertoire.white_tree, &["e4", "c5"]);
        assert_eq!(c5.children.len(), 2);
        assert!(c5.children.contains_key("Nf3"));
        assert!(c5.children.contains_key("Nc3"));
        assert!(walk(&repertoire.white_tree, &["e4", "c5", "Nf3", "d6"]).is_leaf());
    }

    #[test]
    fn trees_are_structurally_identical() {
        let mut builder = RepertoireBuilder::new();
        builder.add_study(ITALIAN, "Italian Game", "White Openings");
        builder.add_study(SICILIAN_LINES, "Sicilian", "Anti-Sicilians");
        let repertoire = builder.build();

        assert_symmetric(&repertoire.white_tree, &repertoire.black_tree);
    }

    #[test]
    fn later_study_wins_shared_path_labels() {
        let mut builder = RepertoireBuilder::new();
        builder.add_study("1. e4 e5 2. Nf3 *", "King's Pawn", "Study A");
        builder.add_study("1. e4 e5 2. Nf3 Nc6 *", "Open Games", "Study B");
        let repertoire = builder.build();

        let nf3 = walk(&repertoire.white_tree, &["e4", "e5", "Nf3"]);
        assert_eq!(nf3.opening_name.as_deref(), Some("Open Games"));
        assert_eq!(nf3.study_name.as_deref(), Some("Study B"));
        // The earlier study's subtree is still there.
        assert!(walk(&repertoire.white_tree, &["e4"]).children.len() == 1);
    }

    #[test]
    fn build_is_idempotent() {
        let mut builder = RepertoireBuilder::new();
        builder.add_study(SICILIAN_LINES, "Sicilian", "Anti-Sicilians");

        let first = builder.build();
        let second = builder.build();

        assert_symmetric(&first.white_tree, &second.black_tree);
        assert_eq!(first.indexed_positions(), second.indexed_positions());
    }

    #[test]
    fn malformed_study_contributes_nothing() {
        let mut builder = RepertoireBuilder::new();
        builder.add_study("this is not { pgn", "Nothing", "Nothing");
        let repertoire = builder.build();

        assert!(repertoire.white_tree.children.is_empty());
        assert!(repertoire.black_tree.children.is_empty());
        assert_eq!(repertoire.indexed_positions(), 0);
    }

    #[test]
    fn illegal_study_move_is_skipped() {
        // Black cannot play Nf3 after 1. e4; the subtree under it must
        // not appear.
        let mut builder = RepertoireBuilder::new();
        builder.add_study("1. e4 Nf3 2. d4 *", "Broken", "Broken");
        let repertoire = builder.build();

        let e4 = walk(&repertoire.white_tree, &["e4"]);
        assert!(e4.children.is_empty());
    }

    #[test]
    fn chapter_without_title_falls_back_to_study_label() {
        let mut builder = RepertoireBuilder::new();
        builder.add_study("1. d4 d5 *", "Queen's Pawn", "QGD Prep");
        let repertoire = builder.build();

        let d4 = walk(&repertoire.white_tree, &["d4"]);
        assert_eq!(d4.study_name.as_deref(), Some("QGD Prep"));
    }

    #[test]
    fn position_index_maps_fingerprints() {
        let mut builder = RepertoireBuilder::new();
        builder.add_study(SICILIAN_LINES, "Sicilian", "Anti-Sicilians");
        let repertoire = builder.build();

        // Position after 1. e4 c5: both knight moves are prepared.
        let mut pos = starting_position();
        for san in ["e4", "c5"] {
            let mv = san.parse::<San>().unwrap().to_move(&pos).unwrap();
            pos = pos.play(mv).unwrap();
        }
        let entry = repertoire.lookup_position(&fingerprint(&pos)).unwrap();
        assert_eq!(entry.opening_name, "Sicilian");
        assert_eq!(entry.branch_count, 2);

        assert!(repertoire.lookup_position("bogus fen").is_none());
    }

    #[test]
    fn chapter_label_derivation() {
        assert_eq!(
            chapter_label(Some("Repertoire: Najdorf"), "Sicilian Prep"),
            "Sicilian Prep - Najdorf"
        );
        assert_eq!(
            chapter_label(Some("Chapter One"), "Sicilian Prep"),
            "Sicilian Prep - Chapter One"
        );
        assert_eq!(chapter_label(None, "Sicilian Prep"), "Sicilian Prep");
        assert_eq!(chapter_label(Some("  "), "Sicilian Prep"), "Sicilian Prep");
    }
}
