//! Infrastructure error taxonomy.
//!
//! Only genuine infrastructure failures are errors: the filesystem refusing
//! a workspace, or the prover binary not being executable at all. Everything
//! the prover itself does (non-zero exit, timeout kill, crash, missing
//! output files) is data, classified into a [`Verdict`](crate::classify::Verdict).

use std::io;
use std::path::PathBuf;

/// Errors that abort a pipeline run before a verdict can be produced.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The workspace directory could not be allocated or written.
    #[error("workspace i/o failure at {}: {source}", path.display())]
    Workspace { path: PathBuf, source: io::Error },

    /// The prover binary could not be spawned at all.
    #[error("failed to spawn prover {}: {source}", program.display())]
    Spawn { program: PathBuf, source: io::Error },

    /// Waiting on the spawned prover failed.
    #[error("failed to wait for prover: {source}")]
    Wait { source: io::Error },
}
