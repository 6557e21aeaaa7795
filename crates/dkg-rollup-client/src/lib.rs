//! DKG Rollup Client
//!
//! The worker side of the rollup: traits for the three external
//! collaborators (action log, state reader, proof submitter), an HTTP client
//! implementing them with retry and backoff, an in-process [`LocalChain`],
//! and the [`RollupWorker`] that ties them to a [`RollupDriver`].
//!
//! # Example
//!
//! ```no_run
//! use dkg_rollup_actions::CommitteeAction;
//! use dkg_rollup_client::{ClientConfig, HttpChainClient, RollupWorker, WorkerOutcome};
//! use dkg_rollup_program::{RollupConfig, RollupDriver, TranscriptBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpChainClient::try_new(&ClientConfig::local())?;
//!     let driver = RollupDriver::<CommitteeAction, _>::new(TranscriptBackend, RollupConfig::default())?;
//!     let mut worker = RollupWorker::new(client, driver, "committee-contract");
//!
//!     while let WorkerOutcome::Submitted { actions, .. } = worker.run_once().await? {
//!         println!("rolled up {actions} actions");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`RollupDriver`]: dkg_rollup_program::RollupDriver

mod config;
mod error;
mod http;
mod local;
mod retry;
mod source;
mod types;
mod worker;

pub use config::{ClientConfig, RetryPolicy};
pub use error::{ClientError, ClientResult};
pub use http::HttpChainClient;
pub use local::LocalChain;
pub use retry::with_retry;
pub use source::{ActionSource, RollupSubmitter, StateReader};
pub use types::*;
pub use worker::{RollupWorker, WorkerOutcome};
