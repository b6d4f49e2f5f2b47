//! Chess.com public API client for game archives

mod client;
mod types;

pub use client::{ChessComClient, RangeQuery};
pub use types::{ArchiveList, ArchivedGame, ArchivedPlayer, MonthlyGames};
