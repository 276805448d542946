use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct StatusReply {
    pub model_ready: bool,
}

#[derive(Serialize)]
pub struct AskRequest<'a> {
    pub question: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AskReply {
    pub label: String,
    #[serde(default)]
    pub response: Option<String>,
    pub question_count: u32,
    #[serde(default)]
    pub guessed_correctly: bool,
    #[serde(default)]
    pub game_over: bool,
}

#[derive(Serialize)]
pub struct GuessRequest<'a> {
    pub guess: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuessReply {
    pub correct: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub question_count: u32,
    #[serde(default)]
    pub game_over: bool,
}

/// The four calls the remote oracle service answers.
pub trait OracleApi: Send + Sync {
    fn status(&self) -> Result<StatusReply>;
    fn reset(&self) -> Result<()>;
    fn ask(&self, question: &str) -> Result<AskReply>;
    fn guess(&self, guess: &str) -> Result<GuessReply>;
}

/// JSON-over-HTTP client for the oracle service.
#[derive(Debug, Clone)]
pub struct OracleClient {
    client: Client,
    base_url: String,
}

impl OracleClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/game/{}", self.base_url, path)
    }
}

impl OracleApi for OracleClient {
    fn status(&self) -> Result<StatusReply> {
        let reply = self
            .client
            .get(self.url("status"))
            .send()?
            .error_for_status()?
            .json::<StatusReply>()
            .context("decoding status reply")?;
        Ok(reply)
    }

    fn reset(&self) -> Result<()> {
        self.client
            .post(self.url("reset"))
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn ask(&self, question: &str) -> Result<AskReply> {
        let reply = self
            .client
            .post(self.url("ask"))
            .json(&AskRequest { question })
            .send()?
            .error_for_status()?
            .json::<AskReply>()
            .context("decoding ask reply")?;
        Ok(reply)
    }

    fn guess(&self, guess: &str) -> Result<GuessReply> {
        let reply = self
            .client
            .post(self.url("guess"))
            .json(&GuessRequest { guess })
            .send()?
            .error_for_status()?
            .json::<GuessReply>()
            .context("decoding guess reply")?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_reply_tolerates_missing_optionals() {
        let reply: AskReply =
            serde_json::from_str(r#"{"label":"close","question_count":3,"max_questions":20}"#)
                .unwrap();
        assert_eq!(reply.label, "close");
        assert_eq!(reply.response, None);
        assert_eq!(reply.question_count, 3);
        assert!(!reply.game_over);
        assert!(!reply.guessed_correctly);
    }

    #[test]
    fn replies_without_a_count_are_rejected() {
        assert!(serde_json::from_str::<AskReply>(r#"{"label":"yes"}"#).is_err());
        assert!(serde_json::from_str::<GuessReply>(r#"{"correct":false}"#).is_err());
    }

    #[test]
    fn guess_reply_requires_verdict() {
        assert!(serde_json::from_str::<GuessReply>(r#"{"message":"hi"}"#).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client =
            OracleClient::new("http://localhost:8001/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("ask"), "http://localhost:8001/api/game/ask");
    }
}
