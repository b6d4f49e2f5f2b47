//! Deviation analysis of played games against a repertoire

mod detector;
mod types;

pub use detector::DeviationAnalyzer;
pub use types::{date_from_epoch, DeviationResult, ResultKind};
