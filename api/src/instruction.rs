use solana_instruction::{AccountMeta, Instruction};
use solana_pubkey::Pubkey;

use crate::{consts::*, pda::*};

/// Mining program instruction discriminators (first data byte).
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MiningInstruction {
    Checkpoint = 2,
    Deploy = 6,
}

impl MiningInstruction {
    pub fn from_data(data: &[u8]) -> Option<Self> {
        match data.first()? {
            2 => Some(Self::Checkpoint),
            6 => Some(Self::Deploy),
            _ => None,
        }
    }
}

/// Realize `authority`'s rewards for `round_id` into its reward balances.
///
/// Accounts:
///   0. signer      (writable, signer)
///   1. board       (writable)
///   2. miner       (writable)
///   3. round       (writable): the round being checkpointed
///   4. treasury    (writable)
///   5. system program
pub fn checkpoint(
    program_id: &Pubkey,
    signer: &Pubkey,
    authority: &Pubkey,
    round_id: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*signer, true),
            AccountMeta::new(board_pda(program_id).0, false),
            AccountMeta::new(miner_pda(program_id, authority).0, false),
            AccountMeta::new(round_pda(program_id, round_id).0, false),
            AccountMeta::new(treasury_pda(program_id).0, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data: vec![MiningInstruction::Checkpoint as u8],
    }
}

/// Deploy `amount` per selected square into `round_id` for `authority`.
///
/// Instruction data: `[discriminator] [amount: u64 LE] [squares: u32 LE]`.
///
/// Accounts:
///   0. signer           (writable, signer): the executor
///   1. authority        (writable)
///   2. automation       (writable)
///   3. board            (writable)
///   4. config           (writable)
///   5. miner            (writable)
///   6. round            (writable)
///   7. system program
///   8. mining program
///   9. entropy var      (writable)
///  10. entropy program
pub fn deploy(
    program_id: &Pubkey,
    signer: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    round_id: u64,
    squares: u32,
) -> Instruction {
    let board = board_pda(program_id).0;

    let mut data = Vec::with_capacity(13);
    data.push(MiningInstruction::Deploy as u8);
    data.extend_from_slice(&amount.to_le_bytes());
    data.extend_from_slice(&squares.to_le_bytes());

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*signer, true),
            AccountMeta::new(*authority, false),
            AccountMeta::new(automation_pda(program_id, authority).0, false),
            AccountMeta::new(board, false),
            AccountMeta::new(config_pda(program_id).0, false),
            AccountMeta::new(miner_pda(program_id, authority).0, false),
            AccountMeta::new(round_pda(program_id, round_id).0, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(*program_id, false),
            AccountMeta::new(entropy_var_pda(&board).0, false),
            AccountMeta::new_readonly(ENTROPY_PROGRAM_ID, false),
        ],
        data,
    }
}
