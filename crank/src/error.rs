use solana_pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

use autodeploy_api::DecodeError;

pub type Result<T> = std::result::Result<T, CrankError>;

#[derive(Debug, Error)]
pub enum CrankError {
    // ── Tick-level ──────────────────────────────────────────────────────
    #[error("round API unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("malformed round response: {0}")]
    MalformedResponse(String),
    #[error("ledger RPC unavailable: {0}")]
    LedgerUnavailable(String),

    // ── Account-level ───────────────────────────────────────────────────
    #[error("account decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("miner account {address} does not belong to this delegation: {reason}")]
    ForeignMiner { address: Pubkey, reason: String },
    #[error("transaction send failed: {0}")]
    SubmissionFailed(String),
    #[error("transaction rejected by RPC node: {0}")]
    Rejected(String),
    #[error("transaction {signature} failed: {reason}")]
    TransactionFailed { signature: Signature, reason: String },
    #[error("blockhash expired before {signature} was confirmed")]
    Expired { signature: Signature },

    // ── Startup ─────────────────────────────────────────────────────────
    #[error("executor key unavailable: {0}")]
    SigningUnavailable(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// How far a failure propagates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Abort the current tick, retry next tick.
    Tick,
    /// Abandon this account for the current tick.
    Account,
    /// Terminate the process.
    Fatal,
}

impl CrankError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CrankError::UpstreamUnavailable(_)
            | CrankError::MalformedResponse(_)
            | CrankError::LedgerUnavailable(_) => FailureKind::Tick,
            CrankError::Decode(_)
            | CrankError::ForeignMiner { .. }
            | CrankError::SubmissionFailed(_)
            | CrankError::Rejected(_)
            | CrankError::TransactionFailed { .. }
            | CrankError::Expired { .. } => FailureKind::Account,
            CrankError::SigningUnavailable(_) | CrankError::Config(_) => FailureKind::Fatal,
        }
    }

    /// Stable short name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            CrankError::UpstreamUnavailable(_) => "upstream_unavailable",
            CrankError::MalformedResponse(_) => "malformed_response",
            CrankError::LedgerUnavailable(_) => "ledger_unavailable",
            CrankError::Decode(_) => "decode",
            CrankError::ForeignMiner { .. } => "foreign_miner",
            CrankError::SubmissionFailed(_) => "submission_failed",
            CrankError::Rejected(_) => "rejected",
            CrankError::TransactionFailed { .. } => "transaction_failed",
            CrankError::Expired { .. } => "expired",
            CrankError::SigningUnavailable(_) => "signing_unavailable",
            CrankError::Config(_) => "config",
        }
    }
}
