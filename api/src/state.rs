use solana_pubkey::Pubkey;

use crate::{
    consts::BOARD_SQUARES,
    error::DecodeError,
    layout::{Reader, Writer},
};

// ── DelegationRecord ────────────────────────────────────────────────────────

/// Delegation (automation) account layout.
///
///   - discriminator   [u8; 8]   (offset 0)
///   - amount          u64 LE    (offset 8)
///   - authority       Pubkey    (offset 16)
///   - balance         u64 LE    (offset 48)
///   - executor        Pubkey    (offset 56)
///   - fee             u64 LE    (offset 88)
///   - strategy        u64 LE    (offset 96)
///   - mask            u64 LE    (offset 104)
pub mod delegation_layout {
    use crate::layout::Field;

    pub const AMOUNT: Field = Field::new(8, 8);
    pub const AUTHORITY: Field = Field::new(16, 32);
    pub const BALANCE: Field = Field::new(48, 8);
    pub const EXECUTOR: Field = Field::new(56, 32);
    pub const FEE: Field = Field::new(88, 8);
    pub const STRATEGY: Field = Field::new(96, 8);
    pub const MASK: Field = Field::new(104, 8);

    pub const MIN_LEN: usize = MASK.end();
}

/// Authorizes `executor` to deploy `amount` per round on behalf of
/// `authority`, paid out of the escrowed `balance`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DelegationRecord {
    /// Stake deployed per triggered round
    pub amount: u64,
    /// Delegator on whose behalf the executor acts
    pub authority: Pubkey,
    /// Escrowed funds covering `amount + fee` per trigger
    pub balance: u64,
    /// Identity allowed to submit deploys for this record
    pub executor: Pubkey,
    /// Per-trigger executor fee
    pub fee: u64,
    pub strategy: u64,
    pub mask: u64,
}

impl DelegationRecord {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        use delegation_layout::*;

        let r = Reader::new(data, MIN_LEN)?;
        Ok(Self {
            amount: r.u64(AMOUNT)?,
            authority: r.pubkey(AUTHORITY)?,
            balance: r.u64(BALANCE)?,
            executor: r.pubkey(EXECUTOR)?,
            fee: r.u64(FEE)?,
            strategy: r.u64(STRATEGY)?,
            mask: r.u64(MASK)?,
        })
    }

    /// Account image with a zeroed discriminator.
    pub fn encode(&self) -> Vec<u8> {
        use delegation_layout::*;

        let mut w = Writer::zeroed(MIN_LEN);
        w.put_u64(AMOUNT, self.amount)
            .put_pubkey(AUTHORITY, &self.authority)
            .put_u64(BALANCE, self.balance)
            .put_pubkey(EXECUTOR, &self.executor)
            .put_u64(FEE, self.fee)
            .put_u64(STRATEGY, self.strategy)
            .put_u64(MASK, self.mask);
        w.finish()
    }

    /// Whether the escrow covers one more trigger. An `amount + fee` that
    /// overflows can never be covered.
    pub fn can_deploy(&self) -> bool {
        self.amount
            .checked_add(self.fee)
            .is_some_and(|cost| self.balance >= cost)
    }
}

// ── MiningRecord ────────────────────────────────────────────────────────────

/// Miner account layout (one per authority).
///
///   - discriminator      [u8; 8]      (offset 0)
///   - authority          Pubkey       (offset 8)
///   - deployed           [u64; 25]    (offset 40)
///   - cumulative         [u64; 25]    (offset 240)
///   - checkpoint_fee     u64 LE       (offset 440)
///   - checkpoint_id      u64 LE       (offset 448)
///   - last_claim_ore_at  i64 LE       (offset 456)
///   - last_claim_sol_at  i64 LE       (offset 464)
///   - rewards_factor     [u8; 16]     (offset 472)
///   - rewards_sol        u64 LE       (offset 488)
///   - rewards_ore        u64 LE       (offset 496)
///   - refined_ore        u64 LE       (offset 504)
///   - round_id           u64 LE       (offset 512)
///
/// Trailing lifetime counters follow `round_id`; they are not read, but
/// the minimum length keeps 16 bytes of margin past `round_id`.
pub mod mining_layout {
    use crate::{consts::BOARD_SQUARES, layout::Field};

    pub const AUTHORITY: Field = Field::new(8, 32);
    pub const DEPLOYED: Field = Field::new(40, BOARD_SQUARES * 8);
    pub const CUMULATIVE: Field = Field::new(240, BOARD_SQUARES * 8);
    pub const CHECKPOINT_FEE: Field = Field::new(440, 8);
    pub const CHECKPOINT_ID: Field = Field::new(448, 8);
    pub const LAST_CLAIM_ORE_AT: Field = Field::new(456, 8);
    pub const LAST_CLAIM_SOL_AT: Field = Field::new(464, 8);
    pub const REWARDS_FACTOR: Field = Field::new(472, 16);
    pub const REWARDS_SOL: Field = Field::new(488, 8);
    pub const REWARDS_ORE: Field = Field::new(496, 8);
    pub const REFINED_ORE: Field = Field::new(504, 8);
    pub const ROUND_ID: Field = Field::new(512, 8);

    pub const MIN_LEN: usize = 536;
}

/// Per-delegator round bookkeeping kept by the mining program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MiningRecord {
    pub authority: Pubkey,
    pub deployed: [u64; BOARD_SQUARES],
    pub cumulative: [u64; BOARD_SQUARES],
    pub checkpoint_fee: u64,
    /// Round whose rewards were last realized
    pub checkpoint_id: u64,
    pub last_claim_ore_at: i64,
    pub last_claim_sol_at: i64,
    /// Fixed-point accumulator, carried opaque
    pub rewards_factor: [u8; 16],
    pub rewards_sol: u64,
    pub rewards_ore: u64,
    pub refined_ore: u64,
    /// Round the record currently references
    pub round_id: u64,
}

impl MiningRecord {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        use mining_layout::*;

        let r = Reader::new(data, MIN_LEN)?;
        Ok(Self {
            authority: r.pubkey(AUTHORITY)?,
            deployed: r.u64_array(DEPLOYED)?,
            cumulative: r.u64_array(CUMULATIVE)?,
            checkpoint_fee: r.u64(CHECKPOINT_FEE)?,
            checkpoint_id: r.u64(CHECKPOINT_ID)?,
            last_claim_ore_at: r.i64(LAST_CLAIM_ORE_AT)?,
            last_claim_sol_at: r.i64(LAST_CLAIM_SOL_AT)?,
            rewards_factor: r.array(REWARDS_FACTOR)?,
            rewards_sol: r.u64(REWARDS_SOL)?,
            rewards_ore: r.u64(REWARDS_ORE)?,
            refined_ore: r.u64(REFINED_ORE)?,
            round_id: r.u64(ROUND_ID)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        use mining_layout::*;

        let mut w = Writer::zeroed(MIN_LEN);
        w.put_pubkey(AUTHORITY, &self.authority)
            .put_u64_array(DEPLOYED, &self.deployed)
            .put_u64_array(CUMULATIVE, &self.cumulative)
            .put_u64(CHECKPOINT_FEE, self.checkpoint_fee)
            .put_u64(CHECKPOINT_ID, self.checkpoint_id)
            .put_i64(LAST_CLAIM_ORE_AT, self.last_claim_ore_at)
            .put_i64(LAST_CLAIM_SOL_AT, self.last_claim_sol_at)
            .put(REWARDS_FACTOR, &self.rewards_factor)
            .put_u64(REWARDS_SOL, self.rewards_sol)
            .put_u64(REWARDS_ORE, self.rewards_ore)
            .put_u64(REFINED_ORE, self.refined_ore)
            .put_u64(ROUND_ID, self.round_id);
        w.finish()
    }

    /// Rewards for `round_id` have not been realized yet.
    pub fn needs_checkpoint(&self) -> bool {
        self.checkpoint_id != self.round_id
    }
}

// Compile-time check that the declared tables match the record sizes.
const _: () = assert!(delegation_layout::MIN_LEN == 112);
const _: () = assert!(mining_layout::ROUND_ID.end() + 16 == mining_layout::MIN_LEN);
