use async_trait::async_trait;
use solana_account::Account;
use solana_account_decoder_client_types::{UiAccount, UiAccountEncoding};
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcSendTransactionConfig},
    rpc_filter::{Memcmp, RpcFilterType},
};
use solana_commitment_config::CommitmentConfig;
use solana_pubkey::Pubkey;
use solana_sdk::{hash::Hash, signature::Signature, transaction::Transaction};
use tracing::{debug, warn};

use autodeploy_api::state::delegation_layout;

use crate::error::{CrankError, Result};

/// Where a submitted signature stands at the configured commitment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureState {
    /// Not seen yet, or seen below the commitment level.
    Pending,
    Confirmed,
    /// Landed with an execution error.
    Failed(String),
}

/// Every ledger call the crank makes.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// All program accounts whose `executor` field equals `executor`.
    /// An empty result is not an error.
    async fn find_delegations(
        &self,
        program_id: &Pubkey,
        executor: &Pubkey,
    ) -> Result<Vec<(Pubkey, Account)>>;

    /// `None` if the account does not exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>>;

    /// Recent blockhash and the last block height at which it is valid.
    async fn latest_blockhash(&self) -> Result<(Hash, u64)>;

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature>;

    async fn signature_state(&self, signature: &Signature) -> Result<SignatureState>;

    async fn block_height(&self) -> Result<u64>;
}

// ── RPC implementation ──────────────────────────────────────────────────────

pub struct RpcLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcLedger {
    pub fn new(rpc_url: String, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url, commitment),
            commitment,
        }
    }
}

fn unavailable(err: ClientError) -> CrankError {
    CrankError::LedgerUnavailable(err.to_string())
}

/// Transport failures are worth resending; anything the node answered
/// (preflight failure, bad blockhash, malformed tx) is not.
fn send_error(err: ClientError) -> CrankError {
    match err.kind() {
        ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => {
            CrankError::SubmissionFailed(err.to_string())
        }
        _ => CrankError::Rejected(err.to_string()),
    }
}

/// Server-side filter matching `executor` at the delegation's executor offset.
pub fn executor_filter(executor: &Pubkey) -> RpcFilterType {
    RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
        delegation_layout::EXECUTOR.offset,
        executor.as_ref(),
    ))
}

/// Binary account data from a scan. Entries the node returned in a form
/// that does not decode are dropped with a warning.
fn decode_accounts(accounts: Vec<(Pubkey, UiAccount)>) -> Vec<(Pubkey, Account)> {
    accounts
        .into_iter()
        .filter_map(|(address, ui)| match ui.decode::<Account>() {
            Some(account) => Some((address, account)),
            None => {
                warn!(delegation = %address, "undecodable account data in scan");
                None
            }
        })
        .collect()
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn find_delegations(
        &self,
        program_id: &Pubkey,
        executor: &Pubkey,
    ) -> Result<Vec<(Pubkey, Account)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![executor_filter(executor)]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        let accounts = self
            .client
            .get_program_ui_accounts_with_config(program_id, config)
            .await
            .map_err(unavailable)?;
        debug!(count = accounts.len(), %executor, "delegation scan");
        Ok(decode_accounts(accounts))
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        self.client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map(|response| response.value)
            .map_err(unavailable)
    }

    async fn latest_blockhash(&self) -> Result<(Hash, u64)> {
        self.client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .map_err(unavailable)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        let config = RpcSendTransactionConfig {
            preflight_commitment: Some(self.commitment.commitment),
            ..RpcSendTransactionConfig::default()
        };
        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(send_error)
    }

    async fn signature_state(&self, signature: &Signature) -> Result<SignatureState> {
        let response = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(unavailable)?;

        let state = match response.value.into_iter().next().flatten() {
            None => SignatureState::Pending,
            Some(status) => match &status.err {
                Some(err) => SignatureState::Failed(err.to_string()),
                None if status.satisfies_commitment(self.commitment) => SignatureState::Confirmed,
                None => SignatureState::Pending,
            },
        };
        Ok(state)
    }

    async fn block_height(&self) -> Result<u64> {
        self.client
            .get_block_height_with_commitment(self.commitment)
            .await
            .map_err(unavailable)
    }
}

#[cfg(test)]
mod tests {
    use solana_account_decoder_client_types::UiAccountData;

    use super::*;

    fn ui_account(data: &str) -> UiAccount {
        UiAccount {
            lamports: 1,
            data: UiAccountData::Binary(data.to_string(), UiAccountEncoding::Base64),
            owner: Pubkey::new_from_array([3u8; 32]).to_string(),
            executable: false,
            rent_epoch: 0,
            space: None,
        }
    }

    #[test]
    fn scan_results_decode_to_raw_accounts() {
        let good = Pubkey::new_from_array([1u8; 32]);
        let bad = Pubkey::new_from_array([2u8; 32]);

        let accounts = decode_accounts(vec![(good, ui_account("AQID")), (bad, ui_account("%%%"))]);

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].0, good);
        assert_eq!(accounts[0].1.data, vec![1, 2, 3]);
        assert_eq!(accounts[0].1.owner, Pubkey::new_from_array([3u8; 32]));
    }

    #[test]
    fn filter_matches_executor_offset() {
        let executor = Pubkey::new_from_array([9u8; 32]);
        let RpcFilterType::Memcmp(memcmp) = executor_filter(&executor) else {
            panic!("expected memcmp filter");
        };
        assert_eq!(memcmp.offset(), 56);
        assert!(memcmp.bytes_match(&[&[0u8; 56][..], executor.as_ref()].concat()));
    }
}
