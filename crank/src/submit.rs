use std::time::Duration;

use solana_sdk::signature::Signature;
use tracing::{debug, warn};

use crate::{
    error::{CrankError, Result},
    ledger::{Ledger, SignatureState},
    tx::PreparedTransaction,
};

#[derive(Clone, Debug)]
pub struct SubmitPolicy {
    /// Resends after a transport failure. Rejections are never resent.
    pub send_retries: u32,
    pub retry_delay: Duration,
    pub poll_interval: Duration,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self {
            send_retries: 3,
            retry_delay: Duration::from_millis(250),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Send `prepared` and wait until it is confirmed, fails, or its blockhash
/// expires.
pub async fn submit<L: Ledger + ?Sized>(
    ledger: &L,
    prepared: &PreparedTransaction,
    policy: &SubmitPolicy,
) -> Result<Signature> {
    let signature = send_with_retries(ledger, prepared, policy).await?;
    confirm(ledger, signature, prepared.last_valid_block_height, policy).await
}

async fn send_with_retries<L: Ledger + ?Sized>(
    ledger: &L,
    prepared: &PreparedTransaction,
    policy: &SubmitPolicy,
) -> Result<Signature> {
    let mut attempt = 0;
    loop {
        match ledger.send_transaction(&prepared.transaction).await {
            Ok(signature) => return Ok(signature),
            Err(CrankError::SubmissionFailed(reason)) if attempt < policy.send_retries => {
                attempt += 1;
                warn!(attempt, %reason, "send failed, retrying");
                tokio::time::sleep(policy.retry_delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn confirm<L: Ledger + ?Sized>(
    ledger: &L,
    signature: Signature,
    last_valid_block_height: u64,
    policy: &SubmitPolicy,
) -> Result<Signature> {
    loop {
        match poll(ledger, &signature).await {
            Some(SignatureState::Confirmed) => return Ok(signature),
            Some(SignatureState::Failed(reason)) => {
                return Err(CrankError::TransactionFailed { signature, reason })
            }
            _ => {}
        }

        let height = match ledger.block_height().await {
            Ok(height) => height,
            Err(err) => {
                debug!(%signature, error = %err, "block height lookup failed");
                tokio::time::sleep(policy.poll_interval).await;
                continue;
            }
        };
        if height > last_valid_block_height {
            // One last look: it may have landed between the two calls.
            return match poll(ledger, &signature).await {
                Some(SignatureState::Confirmed) => Ok(signature),
                Some(SignatureState::Failed(reason)) => {
                    Err(CrankError::TransactionFailed { signature, reason })
                }
                _ => Err(CrankError::Expired { signature }),
            };
        }

        tokio::time::sleep(policy.poll_interval).await;
    }
}

/// Status lookup; a failed lookup counts as still pending.
async fn poll<L: Ledger + ?Sized>(ledger: &L, signature: &Signature) -> Option<SignatureState> {
    match ledger.signature_state(signature).await {
        Ok(state) => Some(state),
        Err(err) => {
            debug!(%signature, error = %err, "status poll failed");
            None
        }
    }
}
