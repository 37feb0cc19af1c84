//! Service configuration.
//!
//! Built once from CLI flags at startup and threaded into the pipeline;
//! nothing below the entry point reads the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Smallest accepted per-request timeout, in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;
/// Largest accepted per-request timeout, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 10;
/// Timeout applied when a request omits the field.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Immutable configuration for the prover pipeline.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path to the prover executable.
    pub prover_path: PathBuf,
    /// Directory under which per-request workspaces are created.
    pub workspace_root: PathBuf,
    /// Memory ceiling for the prover process, in MB.
    pub memory_limit_mb: u64,
    /// Output-size ceiling handed to the prover as an argument, in KB.
    pub output_limit_kb: u64,
    /// Ceiling on how much of each captured stream is retained, in bytes.
    pub capture_limit_bytes: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            prover_path: PathBuf::from("sequent-prover"),
            workspace_root: std::env::temp_dir().join("proofbox"),
            memory_limit_mb: 500,
            output_limit_kb: 512,
            capture_limit_bytes: 1024 * 1024,
        }
    }
}

impl ServiceConfig {
    /// Memory ceiling in bytes, as applied to the child process.
    pub fn memory_limit_bytes(&self) -> u64 {
        self.memory_limit_mb * 1024 * 1024
    }
}

/// Check a requested timeout against the accepted range.
pub fn validate_timeout(secs: u64) -> Result<Duration, String> {
    if (MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&secs) {
        Ok(Duration::from_secs(secs))
    } else {
        Err(format!(
            "timeout must be between {} and {} seconds, got {}",
            MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS, secs
        ))
    }
}
