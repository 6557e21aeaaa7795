//! DKG Rollup Contract
//!
//! The on-chain side of the rollup: an append-only [`ActionLog`] that
//! maintains the action hash chain, and [`RollupContract::rollup`], the single
//! commit point that accepts a proof only when it starts from the stored
//! `(action_state, root)` pair and ends at a state the log actually produced.

pub mod contract;
pub mod error;
pub mod log;

pub use contract::RollupContract;
pub use error::{ContractError, ContractResult};
pub use log::ActionLog;
