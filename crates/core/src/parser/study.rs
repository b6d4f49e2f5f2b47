//! Study-document PGN parsing
//!
//! Unlike the played-game parser, this one descends into variations:
//! each chapter of a study becomes a full move tree, branch points
//! wherever the annotator recorded an alternative.
//!
//! Ingestion is best-effort throughout. A document that cannot be read
//! yields the chapters parsed so far, possibly none; it never errors.

use pgn_reader::{RawTag, SanPlus, Skip, Visitor};
use std::io::Cursor;
use std::ops::ControlFlow;

/// One move option and everything prepared after it.
#[derive(Debug, Clone)]
pub struct MoveNode {
    pub san: String,
    pub children: Vec<MoveNode>,
}

/// One chapter of a study: an optional title plus the move tree
/// starting from the initial position (possibly several first-move
/// options).
#[derive(Debug, Clone)]
pub struct Chapter {
    pub title: Option<String>,
    pub root: Vec<MoveNode>,
}

#[derive(Default)]
struct ChapterTags {
    title: Option<String>,
}

/// Variation frames index into a node arena so that nested variations
/// can re-anchor at the position before the move they replace.
struct Frame {
    /// Node the next move continues from (`None` = start of game).
    cursor: Option<usize>,
    /// Cursor as it was before the last move at this level; a
    /// variation branches from here.
    prev: Option<usize>,
}

struct ArenaNode {
    san: String,
    children: Vec<usize>,
}

struct ChapterTree {
    title: Option<String>,
    nodes: Vec<ArenaNode>,
    roots: Vec<usize>,
    stack: Vec<Frame>,
}

struct StudyParser;

impl Visitor for StudyParser {
    type Tags = ChapterTags;
    type Movetext = ChapterTree;
    type Output = Option<Chapter>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(ChapterTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        // Lichess study exports carry the chapter name in the Event tag.
        if name == b"Event" {
            tags.title = Some(value.decode_utf8_lossy().to_string());
        }
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(ChapterTree {
            title: tags.title,
            nodes: Vec::new(),
            roots: Vec::new(),
            stack: vec![Frame {
                cursor: None,
                prev: None,
            }],
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        let idx = movetext.nodes.len();
        movetext.nodes.push(ArenaNode {
            san: san.san.to_string(),
            children: Vec::new(),
        });

        let Some(frame) = movetext.stack.last_mut() else {
            return ControlFlow::Continue(());
        };
        match frame.cursor {
            Some(parent) => movetext.nodes[parent].children.push(idx),
            None => movetext.roots.push(idx),
        }
        frame.prev = frame.cursor;
        frame.cursor = Some(idx);

        ControlFlow::Continue(())
    }

    fn begin_variation(
        &mut self,
        movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        let Some(frame) = movetext.stack.last() else {
            return ControlFlow::Continue(Skip(true));
        };
        // A variation with no preceding move at this level is
        // malformed; skip it rather than guessing an anchor.
        if frame.cursor == frame.prev {
            return ControlFlow::Continue(Skip(true));
        }
        movetext.stack.push(Frame {
            cursor: frame.prev,
            prev: frame.prev,
        });
        ControlFlow::Continue(Skip(false))
    }

    fn end_variation(&mut self, movetext: &mut Self::Movetext) -> ControlFlow<Self::Output> {
        if movetext.stack.len() > 1 {
            movetext.stack.pop();
        }
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        let root = movetext
            .roots
            .iter()
            .map(|&idx| assemble(&movetext.nodes, idx))
            .collect();
        Some(Chapter {
            title: movetext.title,
            root,
        })
    }
}

fn assemble(nodes: &[ArenaNode], idx: usize) -> MoveNode {
    MoveNode {
        san: nodes[idx].san.clone(),
        children: nodes[idx]
            .children
            .iter()
            .map(|&child| assemble(nodes, child))
            .collect(),
    }
}

/// Parse a study document into its chapters.
pub fn parse_study(pgn: &str) -> Vec<Chapter> {
    let mut parser = StudyParser;
    let mut chapters = Vec::new();

    let cursor = Cursor::new(pgn.as_bytes());
    let mut reader = pgn_reader::Reader::new(cursor);

    loop {
        match reader.read_game(&mut parser) {
            Ok(Some(maybe_chapter)) => {
                if let Some(chapter) = maybe_chapter {
                    chapters.push(chapter);
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!("stopping study read: {}", e);
                break;
            }
        }
    }

    chapters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(nodes: &'a [MoveNode], san: &str) -> Option<&'a MoveNode> {
        nodes.iter().find(|n| n.san == san)
    }

    #[test]
    fn parses_mainline_as_single_chain() {
        let chapters = parse_study("1. e4 e5 2. Nf3 *");
        assert_eq!(chapters.len(), 1);

        let root = &chapters[0].root;
        assert_eq!(root.len(), 1);
        let e4 = find(root, "e4").unwrap();
        let e5 = find(&e4.children, "e5").unwrap();
        assert!(find(&e5.children, "Nf3").is_some());
    }

    #[test]
    fn variation_branches_from_position_before_move() {
        // 1...c5 is an alternative to 1...e5, so both hang off e4.
        let chapters = parse_study("1. e4 e5 (1... c5 2. Nf3) 2. Nc3 *");
        let e4 = &chapters[0].root[0];
        assert_eq!(e4.children.len(), 2);

        let e5 = find(&e4.children, "e5").unwrap();
        assert!(find(&e5.children, "Nc3").is_some());

        let c5 = find(&e4.children, "c5").unwrap();
        assert!(find(&c5.children, "Nf3").is_some());
    }

    #[test]
    fn nested_variations() {
        let chapters = parse_study("1. e4 e5 2. Nf3 (2. Nc3 Nf6 (2... Nc6)) Nc6 *");
        let e4 = &chapters[0].root[0];
        let e5 = find(&e4.children, "e5").unwrap();
        assert_eq!(e5.children.len(), 2);

        let nc3 = find(&e5.children, "Nc3").unwrap();
        assert_eq!(nc3.children.len(), 2);
        assert!(find(&nc3.children, "Nf6").is_some());
        assert!(find(&nc3.children, "Nc6").is_some());
    }

    #[test]
    fn multiple_chapters_with_titles() {
        let pgn = r#"[Event "My Repertoire: Italian Game"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 *

[Event "My Repertoire: Ruy Lopez"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 *
"#;
        let chapters = parse_study(pgn);
        assert_eq!(chapters.len(), 2);
        assert_eq!(
            chapters[0].title.as_deref(),
            Some("My Repertoire: Italian Game")
        );
        assert_eq!(
            chapters[1].title.as_deref(),
            Some("My Repertoire: Ruy Lopez")
        );
    }

    #[test]
    fn garbage_input_yields_no_chapters_or_moves() {
        let chapters = parse_study("not a pgn at all {{{");
        let total_moves: usize = chapters.iter().map(|c| c.root.len()).sum();
        assert_eq!(total_moves, 0);
    }
}
