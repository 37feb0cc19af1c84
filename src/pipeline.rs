//! The per-request pipeline: workspace, invocation, harvest, classify.
//!
//! One linear state machine with a single guaranteed-cleanup exit. The
//! workspace is released on every path out of `execute`, including
//! infrastructure errors, and its `Drop` impl backs that up.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::classify::{classify, Verdict};
use crate::config::ServiceConfig;
use crate::error::PipelineError;
use crate::harvest::{harvest, Artifact, ArtifactSet, RenderFormat};
use crate::runner::{run, InvocationSpec, ProcessOutcome};
use crate::workspace::Workspace;

/// A request that already passed boundary validation.
#[derive(Debug, Clone)]
pub struct ProveRequest {
    /// The sequent to prove; non-empty.
    pub sequent: String,
    /// Rendering formats to request from the prover.
    pub formats: BTreeSet<RenderFormat>,
    /// Wall-clock bound for the prover, within the accepted range.
    pub timeout: Duration,
}

/// The structured result handed back to the transport layer.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    pub verdict: Verdict,
    /// Raw diagnostic text: the prover log when harvested, else stdout.
    pub diagnostic: String,
    /// Rendered proof trees, present only for formats that were both
    /// requested and actually produced.
    pub artifacts: BTreeMap<RenderFormat, String>,
    /// Normalized form of the input, when the prover emitted it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
}

/// Coordinates one prover invocation per call; safe to share across requests.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ServiceConfig,
}

impl Pipeline {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline for one validated request.
    ///
    /// Errs only on infrastructure failure (workspace allocation, spawn);
    /// every prover-level outcome is a [`Verdict`] inside the record.
    pub async fn execute(&self, request: &ProveRequest) -> Result<ResultRecord, PipelineError> {
        let mut ws = Workspace::acquire(&self.config.workspace_root)?;
        info!(workspace = %ws.path().display(), formats = ?request.formats, "pipeline started");
        let result = self.execute_in(&ws, request).await;
        ws.release();
        result
    }

    async fn execute_in(
        &self,
        ws: &Workspace,
        request: &ProveRequest,
    ) -> Result<ResultRecord, PipelineError> {
        let input = ws.write_input(&request.sequent)?;
        let spec = self.invocation_spec(ws, &input, request);
        let outcome = run(&spec).await?;

        let mut vocabulary = vec![Artifact::ProverLog, Artifact::NormalizedInput];
        vocabulary.extend(request.formats.iter().map(|f| Artifact::Rendered(*f)));
        let harvested = harvest(ws, &vocabulary);

        let verdict = classify(&outcome, &request.formats, &harvested);
        info!(?verdict, exit_code = outcome.exit_code, "prover run classified");

        Ok(assemble(verdict, outcome, harvested, &request.formats))
    }

    fn invocation_spec(
        &self,
        ws: &Workspace,
        input: &Path,
        request: &ProveRequest,
    ) -> InvocationSpec {
        let mut args = vec![
            "--input".to_string(),
            input.display().to_string(),
            "--out-dir".to_string(),
            ws.path().display().to_string(),
            "--max-output-kb".to_string(),
            self.config.output_limit_kb.to_string(),
        ];
        for format in &request.formats {
            args.push(format!("--format={}", format.as_str()));
        }
        InvocationSpec {
            program: self.config.prover_path.clone(),
            args,
            timeout: request.timeout,
            memory_limit_bytes: self.config.memory_limit_bytes(),
            capture_limit_bytes: self.config.capture_limit_bytes,
        }
    }
}

fn assemble(
    verdict: Verdict,
    outcome: ProcessOutcome,
    mut harvested: ArtifactSet,
    requested: &BTreeSet<RenderFormat>,
) -> ResultRecord {
    let diagnostic = harvested
        .remove(&Artifact::ProverLog)
        .unwrap_or(outcome.stdout);
    let normalized = harvested.remove(&Artifact::NormalizedInput);
    let artifacts = requested
        .iter()
        .filter_map(|format| {
            harvested
                .remove(&Artifact::Rendered(*format))
                .map(|contents| (*format, contents))
        })
        .collect();

    ResultRecord {
        verdict,
        diagnostic,
        artifacts,
        normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        verdict: Verdict,
        stdout: &str,
        harvested: ArtifactSet,
        requested: &[RenderFormat],
    ) -> ResultRecord {
        let outcome = ProcessOutcome {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: 0,
        };
        assemble(
            verdict,
            outcome,
            harvested,
            &requested.iter().copied().collect(),
        )
    }

    #[test]
    fn diagnostic_prefers_log_over_stdout() {
        let mut harvested = ArtifactSet::new();
        harvested.insert(Artifact::ProverLog, "from log".to_string());
        let rec = record(Verdict::Success, "from stdout", harvested, &[]);
        assert_eq!(rec.diagnostic, "from log");
    }

    #[test]
    fn diagnostic_falls_back_to_stdout() {
        let rec = record(Verdict::Success, "from stdout", ArtifactSet::new(), &[]);
        assert_eq!(rec.diagnostic, "from stdout");
    }

    #[test]
    fn only_requested_formats_land_in_artifacts() {
        let mut harvested = ArtifactSet::new();
        harvested.insert(
            Artifact::Rendered(RenderFormat::Bussproofs),
            "requested".to_string(),
        );
        harvested.insert(
            Artifact::Rendered(RenderFormat::Ebproof),
            "unrequested".to_string(),
        );
        let rec = record(
            Verdict::Success,
            "",
            harvested,
            &[RenderFormat::Bussproofs],
        );
        assert_eq!(rec.artifacts.len(), 1);
        assert_eq!(rec.artifacts[&RenderFormat::Bussproofs], "requested");
    }

    #[test]
    fn normalized_input_is_carried_when_present() {
        let mut harvested = ArtifactSet::new();
        harvested.insert(Artifact::NormalizedInput, "A |- A".to_string());
        let rec = record(Verdict::Success, "", harvested, &[]);
        assert_eq!(rec.normalized.as_deref(), Some("A |- A"));
    }
}
