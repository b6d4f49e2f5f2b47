//! Lichess API client for OAuth and study documents

mod client;
mod types;

pub use client::LichessClient;
pub use types::{Account, Study, TokenResponse};
