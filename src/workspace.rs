//! Per-request ephemeral workspaces.
//!
//! Each prover invocation gets a private, uniquely named directory that is
//! recursively destroyed when the pipeline finishes, whatever the outcome.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use crate::error::PipelineError;

/// File the input sequent is materialized into before invocation.
pub const INPUT_FILE: &str = "input.sq";

/// A uniquely named scratch directory owned by one in-flight request.
///
/// Release is explicit and idempotent; `Drop` re-runs it so no exit path can
/// leak the directory.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    released: bool,
}

impl Workspace {
    /// Create a fresh, empty workspace under `root`.
    ///
    /// The directory name carries a v4 UUID, so concurrently acquired
    /// workspaces never collide.
    pub fn acquire(root: &Path) -> Result<Self, PipelineError> {
        let dir = root.join(Uuid::new_v4().to_string());
        fs::create_dir_all(&dir).map_err(|source| PipelineError::Workspace {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Write the input sequent into the workspace, returning the file path.
    pub fn write_input(&self, sequent: &str) -> Result<PathBuf, PipelineError> {
        let path = self.dir.join(INPUT_FILE);
        fs::write(&path, sequent).map_err(|source| PipelineError::Workspace {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Recursively delete the workspace.
    ///
    /// Idempotent, and tolerant of the prover having already removed parts
    /// of the tree. Deletion failure is logged, never raised.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(dir = %self.dir.display(), error = %e, "failed to remove workspace");
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}
