//! Program-derived addresses for every account the checkpoint and deploy
//! instructions touch. All derivations take the mining program id so the
//! crank can target a redeployed program.
use solana_pubkey::Pubkey;

use crate::consts::*;

pub fn automation_pda(program_id: &Pubkey, authority: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[AUTOMATION, authority.as_ref()], program_id)
}

pub fn board_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[BOARD], program_id)
}

pub fn config_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG], program_id)
}

pub fn miner_pda(program_id: &Pubkey, authority: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[MINER, authority.as_ref()], program_id)
}

pub fn round_pda(program_id: &Pubkey, round_id: u64) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ROUND, &round_id.to_le_bytes()], program_id)
}

pub fn treasury_pda(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[TREASURY], program_id)
}

/// Entropy var backing the board, owned by the entropy program.
pub fn entropy_var_pda(board: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[VAR, board.as_ref(), &BOARD_VAR_ID.to_le_bytes()],
        &ENTROPY_PROGRAM_ID,
    )
}
