//! Off-chain executor for delegated mining.
//!
//! Every tick: read the current round, find the delegations naming this
//! executor, and for each one submit the checkpoint and/or deploy the
//! mining program needs. See [`scheduler::Crank`] for the loop itself.

pub mod config;
pub mod error;
pub mod ledger;
pub mod round;
pub mod scheduler;
pub mod submit;
pub mod tx;

pub use error::{CrankError, FailureKind, Result};
