//! Interface to the on-chain mining program as seen by an automation
//! executor: account layouts, PDA derivation, instruction builders and the
//! per-delegator deploy decision.
//!
//! Nothing in this crate performs I/O. The crank crate feeds it raw account
//! bytes and the current round id, and submits whatever instructions it
//! returns.

pub mod consts;
pub mod decision;
pub mod error;
pub mod instruction;
pub mod layout;
pub mod pda;
pub mod selection;
pub mod state;

pub use decision::{decide, Action};
pub use error::DecodeError;
pub use selection::{FullSelection, SquareSelection};
pub use state::{DelegationRecord, MiningRecord};
