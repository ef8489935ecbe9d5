//! Transaction assembly: instruction list for an [`Action`], fee payer,
//! recent blockhash and executor signature.
use solana_instruction::Instruction;
use solana_pubkey::Pubkey;
use solana_sdk::{
    hash::Hash,
    signature::{Keypair, Signer},
    transaction::Transaction,
};

use autodeploy_api::{Action, DelegationRecord, SquareSelection};

/// A signed transaction and the block height after which it can no longer
/// land.
pub struct PreparedTransaction {
    pub transaction: Transaction,
    pub last_valid_block_height: u64,
}

/// Instructions for `action` on behalf of `delegation`, checkpoint first.
pub fn plan(
    action: &Action,
    program_id: &Pubkey,
    executor: &Pubkey,
    delegation: &DelegationRecord,
    selection: &dyn SquareSelection,
) -> Vec<Instruction> {
    let squares = selection.squares(delegation);
    action.instructions(program_id, executor, delegation, squares)
}

/// Sign `instructions` with the executor as sole signer and fee payer.
pub fn sign(
    instructions: &[Instruction],
    executor: &Keypair,
    blockhash: Hash,
    last_valid_block_height: u64,
) -> PreparedTransaction {
    let transaction = Transaction::new_signed_with_payer(
        instructions,
        Some(&executor.pubkey()),
        &[executor],
        blockhash,
    );
    PreparedTransaction {
        transaction,
        last_valid_block_height,
    }
}
