//! Proofbox - bounded sequent-prover execution with an HTTP API.
//!
//! Accepts a sequent plus a set of requested proof-tree rendering formats,
//! runs the external prover under a wall-clock timeout and memory ceiling
//! inside an ephemeral per-request workspace, classifies the outcome, and
//! returns whatever artifacts the prover produced.

pub mod classify;
pub mod config;
pub mod error;
pub mod harvest;
pub mod http_server;
pub mod pipeline;
pub mod runner;
pub mod state;
pub mod workspace;

pub use classify::Verdict;
pub use config::ServiceConfig;
pub use error::PipelineError;
pub use harvest::RenderFormat;
pub use pipeline::{Pipeline, ProveRequest, ResultRecord};
