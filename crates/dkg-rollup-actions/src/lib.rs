//! DKG Rollup Actions
//!
//! Action records dispatched by the DKG contracts and the hash chain that
//! commits to them.
//!
//! # Families
//!
//! - [`CommitteeAction`]: committee creation and membership
//! - [`KeyAction`]: threshold key lifecycle
//! - [`ContributionAction`]: round 1/2 contributions and decryption responses
//! - [`RequestAction`]: decryption request lifecycle
//! - [`RequesterAction`]: encrypted task accumulation
//!
//! Every family packs its small integer sub-fields into a single field element
//! with a fixed [`BitLayout`], followed by payload slots. Packing truncates
//! out-of-range values; range checking is the caller's job.

pub mod action;
pub mod chain;
pub mod codec;
pub mod committee;
pub mod contribution;
pub mod error;
pub mod group;
pub mod key;
pub mod limits;
pub mod request;
pub mod requester;

pub use action::{registry_entry, Action, ActionKind, ActionRegistryEntry, ACTION_REGISTRY};
pub use chain::{batch_hash, ActionChain, ActionState};
pub use codec::{bits_for, BitField, BitLayout};
pub use committee::{CommitteeAction, CommitteeActionType};
pub use contribution::{ContributionAction, ContributionRound};
pub use error::{CodecError, CodecResult};
pub use group::GroupElement;
pub use key::{KeyAction, KeyActionType};
pub use request::{RequestAction, RequestActionType};
pub use requester::RequesterAction;
