//! Repertoire trees built from study documents

mod builder;
mod tree;

pub use builder::RepertoireBuilder;
pub use tree::{PositionEntry, Repertoire, RepertoireNode};
