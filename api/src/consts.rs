use solana_pubkey::Pubkey;

// ── Program ids ─────────────────────────────────────────────────────────────

/// Mining program. Owns delegation (automation) and miner accounts.
pub const MINING_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("oreV3EG1i9BEgiAJ8b177Z2S2rMarzak4NMv1kULvWv");

/// Entropy program consulted by the mining program during deploy.
pub const ENTROPY_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("3jSkUuYBoJzQPMEzTvkDFXCZUBksPamrVhrnHR9igu2X");

pub const SYSTEM_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("11111111111111111111111111111111");

// ── PDA seeds ───────────────────────────────────────────────────────────────

pub const AUTOMATION: &[u8] = b"automation";
pub const BOARD: &[u8] = b"board";
pub const CONFIG: &[u8] = b"config";
pub const MINER: &[u8] = b"miner";
pub const ROUND: &[u8] = b"round";
pub const TREASURY: &[u8] = b"treasury";

/// Entropy var seed. The board's var lives at index 0.
pub const VAR: &[u8] = b"var";
pub const BOARD_VAR_ID: u64 = 0;

// ── Board geometry ──────────────────────────────────────────────────────────

/// Squares on the board; also the length of the per-square miner arrays.
pub const BOARD_SQUARES: usize = 25;
