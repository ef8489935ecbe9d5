use solana_instruction::Instruction;
use solana_pubkey::Pubkey;

use crate::{
    instruction,
    state::{DelegationRecord, MiningRecord},
};

/// What the executor should submit for one delegation this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Nothing to realize and the escrow cannot cover a deploy.
    Skip,
    /// Realize rewards for the round the miner still references.
    CheckpointOnly { round_id: u64 },
    /// Checkpoint the stale round, then deploy into the current one.
    CheckpointThenDeploy {
        checkpoint_round_id: u64,
        deploy_round_id: u64,
    },
    DeployOnly { round_id: u64 },
}

/// Decide the action for one delegation.
///
/// A checkpoint always targets the round the miner record still references,
/// never the current round. `mining` is `None` when the delegator has no
/// miner account yet, in which case there is nothing to checkpoint.
pub fn decide(
    delegation: &DelegationRecord,
    mining: Option<&MiningRecord>,
    current_round_id: u64,
) -> Action {
    let stale_round = mining
        .filter(|m| m.needs_checkpoint())
        .map(|m| m.round_id);

    match (delegation.can_deploy(), stale_round) {
        (false, None) => Action::Skip,
        (false, Some(round_id)) => Action::CheckpointOnly { round_id },
        (true, Some(checkpoint_round_id)) => Action::CheckpointThenDeploy {
            checkpoint_round_id,
            deploy_round_id: current_round_id,
        },
        (true, None) => Action::DeployOnly {
            round_id: current_round_id,
        },
    }
}

impl Action {
    pub fn checkpoint_round(&self) -> Option<u64> {
        match *self {
            Action::CheckpointOnly { round_id } => Some(round_id),
            Action::CheckpointThenDeploy {
                checkpoint_round_id,
                ..
            } => Some(checkpoint_round_id),
            _ => None,
        }
    }

    pub fn deploy_round(&self) -> Option<u64> {
        match *self {
            Action::DeployOnly { round_id } => Some(round_id),
            Action::CheckpointThenDeploy {
                deploy_round_id, ..
            } => Some(deploy_round_id),
            _ => None,
        }
    }

    /// Outcome label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Skip => "skipped",
            Action::CheckpointOnly { .. } => "checkpointed",
            Action::CheckpointThenDeploy { .. } => "checkpointed+deployed",
            Action::DeployOnly { .. } => "deployed",
        }
    }

    /// Ordered instruction list for this action. The checkpoint, when
    /// present, always comes first so both land in one atomic transaction.
    pub fn instructions(
        &self,
        program_id: &Pubkey,
        executor: &Pubkey,
        delegation: &DelegationRecord,
        squares: u32,
    ) -> Vec<Instruction> {
        let authority = &delegation.authority;
        let mut ixs = Vec::with_capacity(2);

        if let Some(round_id) = self.checkpoint_round() {
            ixs.push(instruction::checkpoint(program_id, executor, authority, round_id));
        }
        if let Some(round_id) = self.deploy_round() {
            ixs.push(instruction::deploy(
                program_id,
                executor,
                authority,
                delegation.amount,
                round_id,
                squares,
            ));
        }
        ixs
    }
}
