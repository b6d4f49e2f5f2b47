//! Lichess API data types

use serde::{Deserialize, Serialize};

/// Response of the OAuth token exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// The authenticated user's account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
}

/// One study as listed by the study API (ndjson).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<u64>,
    #[serde(default)]
    pub created_at: Option<u64>,
}
