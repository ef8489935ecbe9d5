use std::{str::FromStr, time::Duration};

use solana_commitment_config::CommitmentConfig;
use solana_pubkey::Pubkey;
use solana_sdk::signature::Keypair;

use autodeploy_api::consts::MINING_PROGRAM_ID;

use crate::error::{CrankError, Result};

// ── Defaults ────────────────────────────────────────────────────────────────

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_ROUND_API_URL: &str = "https://api.ore.supply/round";
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_SEND_RETRIES: u32 = 3;
pub const DEFAULT_CONFIRM_POLL_MS: u64 = 500;

/// Environment variables holding the executor secret key, in lookup order.
pub const KEYPAIR_VARS: [&str; 2] = ["EXECUTOR_KEYPAIR", "PRIVATE_KEY"];

/// Process configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub rpc_url: String,
    pub round_api_url: String,
    pub commitment: CommitmentConfig,
    pub tick_interval: Duration,
    /// Extra send attempts after the first one fails in transit
    pub send_retries: u32,
    pub confirm_poll: Duration,
    pub program_id: Pubkey,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys take their
    /// defaults; malformed values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            rpc_url: get("RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            round_api_url: get("ROUND_API_URL")
                .unwrap_or_else(|| DEFAULT_ROUND_API_URL.to_string()),
            commitment: get("COMMITMENT")
                .map(|v| parse_commitment(&v))
                .transpose()?
                .unwrap_or_else(CommitmentConfig::confirmed),
            tick_interval: Duration::from_millis(parse_or(
                get("TICK_INTERVAL_MS"),
                "TICK_INTERVAL_MS",
                DEFAULT_TICK_INTERVAL_MS,
            )?),
            send_retries: parse_or(get("SEND_RETRIES"), "SEND_RETRIES", DEFAULT_SEND_RETRIES)?,
            confirm_poll: Duration::from_millis(parse_or(
                get("CONFIRM_POLL_MS"),
                "CONFIRM_POLL_MS",
                DEFAULT_CONFIRM_POLL_MS,
            )?),
            program_id: match get("ORE_PROGRAM_ID") {
                Some(v) => Pubkey::from_str(v.trim())
                    .map_err(|e| CrankError::Config(format!("ORE_PROGRAM_ID: {e}")))?,
                None => MINING_PROGRAM_ID,
            },
        };

        if config.tick_interval.is_zero() {
            return Err(CrankError::Config("TICK_INTERVAL_MS must be > 0".into()));
        }
        Ok(config)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| CrankError::Config(format!("{key}: {e}"))),
        None => Ok(default),
    }
}

fn parse_commitment(value: &str) -> Result<CommitmentConfig> {
    match value.trim().to_ascii_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(CrankError::Config(format!("COMMITMENT: unknown level {other:?}"))),
    }
}

// ── Executor key ────────────────────────────────────────────────────────────

pub fn load_executor() -> Result<Keypair> {
    load_executor_with(|key| std::env::var(key).ok())
}

pub fn load_executor_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Keypair> {
    let (var, secret) = KEYPAIR_VARS
        .iter()
        .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()).map(|v| (*var, v)))
        .ok_or_else(|| {
            CrankError::SigningUnavailable(format!("set {} to the executor secret key", KEYPAIR_VARS[0]))
        })?;

    parse_keypair(&secret).map_err(|reason| CrankError::SigningUnavailable(format!("{var}: {reason}")))
}

/// Accepts a base58 secret key, or the JSON byte array written by
/// `solana-keygen`.
fn parse_keypair(secret: &str) -> std::result::Result<Keypair, String> {
    let secret = secret.trim();
    let bytes: Vec<u8> = if secret.starts_with('[') {
        serde_json::from_str(secret).map_err(|e| format!("invalid JSON key array: {e}"))?
    } else {
        bs58::decode(secret)
            .into_vec()
            .map_err(|e| format!("invalid base58: {e}"))?
    };
    Keypair::try_from(bytes.as_slice()).map_err(|e| format!("invalid keypair bytes: {e}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use solana_sdk::signature::Signer;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.tick_interval, Duration::from_millis(2_000));
        assert_eq!(config.send_retries, 3);
        assert_eq!(config.commitment, CommitmentConfig::confirmed());
        assert_eq!(config.program_id, MINING_PROGRAM_ID);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("RPC_URL", "http://localhost:8899"),
            ("COMMITMENT", "Finalized"),
            ("TICK_INTERVAL_MS", "750"),
            ("SEND_RETRIES", "5"),
        ]))
        .unwrap();
        assert_eq!(config.rpc_url, "http://localhost:8899");
        assert_eq!(config.commitment, CommitmentConfig::finalized());
        assert_eq!(config.tick_interval, Duration::from_millis(750));
        assert_eq!(config.send_retries, 5);
    }

    #[test]
    fn malformed_values_are_config_errors() {
        for pairs in [
            [("TICK_INTERVAL_MS", "soon")],
            [("TICK_INTERVAL_MS", "0")],
            [("COMMITMENT", "eventually")],
            [("ORE_PROGRAM_ID", "not-a-key")],
        ] {
            let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, CrankError::Config(_)), "{pairs:?} -> {err}");
        }
    }

    #[test]
    fn missing_key_is_signing_unavailable() {
        let err = load_executor_with(lookup(&[])).unwrap_err();
        assert!(matches!(err, CrankError::SigningUnavailable(_)));
        assert_eq!(err.kind(), crate::FailureKind::Fatal);
    }

    #[test]
    fn base58_and_json_keys_load() {
        let keypair = Keypair::new();
        let b58 = bs58::encode(keypair.to_bytes()).into_string();
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();

        let from_b58 = load_executor_with(lookup(&[("EXECUTOR_KEYPAIR", b58.as_str())])).unwrap();
        let from_json = load_executor_with(lookup(&[("PRIVATE_KEY", json.as_str())])).unwrap();
        assert_eq!(from_b58.pubkey(), keypair.pubkey());
        assert_eq!(from_json.pubkey(), keypair.pubkey());
    }

    #[test]
    fn garbage_key_is_signing_unavailable() {
        let err = load_executor_with(lookup(&[("EXECUTOR_KEYPAIR", "0OIl")])).unwrap_err();
        assert!(matches!(err, CrankError::SigningUnavailable(_)));
    }
}
