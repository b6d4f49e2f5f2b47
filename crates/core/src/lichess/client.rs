//! Lichess API client for OAuth token exchange and study fetching

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;

use super::types::*;
use crate::error::{Error, Result};

const LICHESS_BASE: &str = "https://lichess.org";

pub struct LichessClient {
    client: Client,
    token: Option<String>,
}

impl LichessClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            token: None,
        })
    }

    pub fn with_token(token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            token: Some(token),
        })
    }

    fn headers(&self, accept: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(accept));

        if let Some(ref token) = self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    /// Exchange a PKCE authorization code for an access token.
    pub async fn exchange_token(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
        client_id: &str,
    ) -> Result<TokenResponse> {
        let response = self
            .client
            .post(format!("{}/api/token", LICHESS_BASE))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", client_id),
                ("code_verifier", code_verifier),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Lichess(format!(
                "token exchange failed: {} - {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        Ok(response.json().await?)
    }

    /// Get the authenticated user's account info.
    pub async fn get_account(&self) -> Result<Account> {
        let response = self
            .client
            .get(format!("{}/api/account", LICHESS_BASE))
            .headers(self.headers("application/json"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Lichess(format!(
                "account request failed: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// List a user's studies (ndjson response, one study per line).
    pub async fn get_user_studies(&self, username: &str) -> Result<Vec<Study>> {
        let response = self
            .client
            .get(format!("{}/api/study/by/{}", LICHESS_BASE, username))
            .headers(self.headers("application/x-ndjson"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Lichess(format!(
                "study list failed: {}",
                response.status()
            )));
        }

        let text = response.text().await?;
        Ok(parse_ndjson_studies(&text))
    }

    /// Fetch the full PGN of a study (all chapters).
    pub async fn get_study_pgn(&self, study_id: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/api/study/{}.pgn", LICHESS_BASE, study_id))
            .headers(self.headers("application/x-chess-pgn"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Lichess(format!(
                "study {} fetch failed: {}",
                study_id,
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

fn parse_ndjson_studies(text: &str) -> Vec<Study> {
    let mut studies = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<Study>(line) {
            Ok(study) => studies.push(study),
            Err(e) => {
                tracing::warn!("failed to parse study line: {}", e);
                continue;
            }
        }
    }

    studies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndjson_parsing_skips_bad_lines() {
        let text = concat!(
            r#"{"id":"a","name":"First"}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"id":"b","name":"Second"}"#,
            "\n"
        );
        let studies = parse_ndjson_studies(text);
        assert_eq!(studies.len(), 2);
        assert_eq!(studies[0].name, "First");
        assert_eq!(studies[1].id, "b");
    }
}
