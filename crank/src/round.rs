use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{CrankError, Result};

/// Mining lifecycle of a round as reported by the read API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    Idle,
    Active,
    Finished,
    Expired,
    /// Anything else the API reports. Treated like an inactive round.
    Unknown(String),
}

impl RoundStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "idle" => RoundStatus::Idle,
            "active" => RoundStatus::Active,
            "finished" => RoundStatus::Finished,
            "expired" => RoundStatus::Expired,
            _ => RoundStatus::Unknown(raw.to_string()),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RoundStatus::Active)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundSnapshot {
    pub round_id: u64,
    pub status: RoundStatus,
}

#[async_trait]
pub trait RoundProvider: Send + Sync {
    async fn fetch_round(&self) -> Result<RoundSnapshot>;
}

// ── HTTP provider ───────────────────────────────────────────────────────────

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpRoundProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpRoundProvider {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CrankError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RoundProvider for HttpRoundProvider {
    async fn fetch_round(&self) -> Result<RoundSnapshot> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CrankError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrankError::UpstreamUnavailable(format!(
                "{} returned {status}",
                self.url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CrankError::UpstreamUnavailable(e.to_string()))?;
        parse_round(&body)
    }
}

// ── Response shape ──────────────────────────────────────────────────────────

/// Round id as a number or numeric string; status at the top level or
/// under `mining` (the nested one wins).
#[derive(Deserialize)]
struct RoundResponse {
    #[serde(alias = "roundId", alias = "round_id")]
    id: Option<NumberOrString>,
    status: Option<String>,
    mining: Option<MiningSection>,
}

#[derive(Deserialize)]
struct MiningSection {
    status: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

pub fn parse_round(body: &str) -> Result<RoundSnapshot> {
    let response: RoundResponse = serde_json::from_str(body)
        .map_err(|e| CrankError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let round_id = match response.id {
        Some(NumberOrString::Number(id)) => id,
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| CrankError::MalformedResponse(format!("round id {s:?} is not a u64")))?,
        None => return Err(CrankError::MalformedResponse("missing round id".into())),
    };

    let status = response
        .mining
        .and_then(|m| m.status)
        .or(response.status)
        .ok_or_else(|| CrankError::MalformedResponse("missing mining status".into()))?;

    Ok(RoundSnapshot {
        round_id,
        status: RoundStatus::parse(&status),
    })
}
