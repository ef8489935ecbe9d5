use crate::{consts::BOARD_SQUARES, state::DelegationRecord};

/// Bitmask with every square selected.
pub const FULL_MASK: u32 = (1u32 << BOARD_SQUARES) - 1;

/// Chooses which squares a deploy targets, as a bitmask (bit `i` = square `i`).
///
/// This is the single place the delegation's `strategy` and `mask` fields
/// could be applied.
pub trait SquareSelection: Send + Sync {
    fn squares(&self, delegation: &DelegationRecord) -> u32;
}

/// Every square, regardless of the delegation's strategy bits.
#[derive(Clone, Copy, Debug, Default)]
pub struct FullSelection;

impl SquareSelection for FullSelection {
    fn squares(&self, _delegation: &DelegationRecord) -> u32 {
        FULL_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mask_covers_all_squares() {
        assert_eq!(FULL_MASK.count_ones() as usize, BOARD_SQUARES);
        assert_eq!(FULL_MASK, 0x01FF_FFFF);
    }

    #[test]
    fn full_selection_ignores_strategy_bits() {
        let delegation = DelegationRecord {
            strategy: 1,
            mask: 0b101,
            ..Default::default()
        };
        assert_eq!(FullSelection.squares(&delegation), FULL_MASK);
    }
}
