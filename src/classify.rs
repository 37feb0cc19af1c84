//! Deterministic failure classification.
//!
//! A single verdict is derived from the process outcome, the harvested
//! artifacts, and the set of formats the request asked for. Checks run in a
//! fixed priority order and the first match wins: the prover's own printed
//! diagnostics are checked before the timeout sentinel, resource-exhaustion
//! signatures only once a timeout is ruled out.
//!
//! The signature strings are literal substrings of the JVM-hosted prover's
//! stable output. They are a contract with the toolchain, kept in one table
//! so the ordering stays unit-testable.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::harvest::{Artifact, ArtifactSet, RenderFormat};
use crate::runner::{ProcessOutcome, TIMEOUT_EXIT_CODE};

/// Marker the prover prints to stdout/log when the input fails to parse.
pub const PARSE_ERROR_MARKER: &str = "Parse error";
/// JVM out-of-memory signature on stderr.
pub const OUT_OF_MEMORY_MARKER: &str = "OutOfMemoryError";
/// JVM stack-overflow signature on stderr.
pub const STACK_OVERFLOW_MARKER: &str = "StackOverflowError";

/// Stderr signatures, checked in order once a timeout is ruled out.
const STDERR_SIGNATURES: &[(&str, Verdict)] = &[
    (OUT_OF_MEMORY_MARKER, Verdict::OutOfMemory),
    (STACK_OVERFLOW_MARKER, Verdict::StackOverflow),
];

/// The single classified outcome of one prover invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Success,
    ParseError,
    Timeout,
    OutOfMemory,
    StackOverflow,
    /// A format the request asked for was not produced.
    MissingArtifact,
    /// No known signature matched, but the run did not satisfy its contract.
    UnexpectedError,
}

/// Derive the verdict for one invocation. Pure; no retries, no side effects.
pub fn classify(
    outcome: &ProcessOutcome,
    requested: &BTreeSet<RenderFormat>,
    harvested: &ArtifactSet,
) -> Verdict {
    let log = harvested
        .get(&Artifact::ProverLog)
        .map(String::as_str)
        .unwrap_or("");

    if outcome.stdout.contains(PARSE_ERROR_MARKER) || log.contains(PARSE_ERROR_MARKER) {
        return Verdict::ParseError;
    }
    if outcome.exit_code == TIMEOUT_EXIT_CODE {
        return Verdict::Timeout;
    }
    for (marker, verdict) in STDERR_SIGNATURES {
        if outcome.stderr.contains(marker) {
            return *verdict;
        }
    }
    if requested
        .iter()
        .any(|format| !harvested.contains_key(&Artifact::Rendered(*format)))
    {
        return Verdict::MissingArtifact;
    }
    if outcome.exit_code != 0 {
        return Verdict::UnexpectedError;
    }
    Verdict::Success
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(stdout: &str, stderr: &str, exit_code: i32) -> ProcessOutcome {
        ProcessOutcome {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code,
        }
    }

    fn requested(formats: &[RenderFormat]) -> BTreeSet<RenderFormat> {
        formats.iter().copied().collect()
    }

    fn harvested(entries: &[(Artifact, &str)]) -> ArtifactSet {
        entries
            .iter()
            .map(|(artifact, contents)| (*artifact, contents.to_string()))
            .collect()
    }

    #[test]
    fn clean_run_with_all_requested_artifacts_is_success() {
        let set = harvested(&[
            (Artifact::ProverLog, "proof found"),
            (Artifact::Rendered(RenderFormat::Bussproofs), "tree"),
            (Artifact::Rendered(RenderFormat::Ebproof), "tree"),
        ]);
        let verdict = classify(
            &outcome("done", "", 0),
            &requested(&[RenderFormat::Bussproofs, RenderFormat::Ebproof]),
            &set,
        );
        assert_eq!(verdict, Verdict::Success);
    }

    #[test]
    fn parse_marker_in_stdout_wins() {
        let verdict = classify(
            &outcome("Parse error in line 1", "", 0),
            &requested(&[]),
            &ArtifactSet::new(),
        );
        assert_eq!(verdict, Verdict::ParseError);
    }

    #[test]
    fn parse_marker_in_log_wins() {
        let set = harvested(&[(Artifact::ProverLog, "Parse error: unexpected '|-'")]);
        let verdict = classify(&outcome("", "", 0), &requested(&[]), &set);
        assert_eq!(verdict, Verdict::ParseError);
    }

    #[test]
    fn parse_marker_beats_timeout_sentinel() {
        let verdict = classify(
            &outcome("Parse error in line 2", "", TIMEOUT_EXIT_CODE),
            &requested(&[]),
            &ArtifactSet::new(),
        );
        assert_eq!(verdict, Verdict::ParseError);
    }

    #[test]
    fn timeout_sentinel_classifies_as_timeout() {
        let set = harvested(&[(Artifact::ProverLog, "foo")]);
        let verdict = classify(
            &outcome("", "", TIMEOUT_EXIT_CODE),
            &requested(&[]),
            &set,
        );
        assert_eq!(verdict, Verdict::Timeout);
    }

    #[test]
    fn timeout_beats_resource_signatures() {
        let verdict = classify(
            &outcome("", "java.lang.OutOfMemoryError: Java heap space", TIMEOUT_EXIT_CODE),
            &requested(&[]),
            &ArtifactSet::new(),
        );
        assert_eq!(verdict, Verdict::Timeout);
    }

    #[test]
    fn oom_signature_beats_missing_artifact_even_on_exit_zero() {
        let verdict = classify(
            &outcome("all good", "java.lang.OutOfMemoryError: Java heap space", 0),
            &requested(&[RenderFormat::Bussproofs]),
            &ArtifactSet::new(),
        );
        assert_eq!(verdict, Verdict::OutOfMemory);
    }

    #[test]
    fn stack_overflow_signature_matches() {
        let verdict = classify(
            &outcome("", "Exception in thread \"main\" java.lang.StackOverflowError", 1),
            &requested(&[]),
            &ArtifactSet::new(),
        );
        assert_eq!(verdict, Verdict::StackOverflow);
    }

    #[test]
    fn oom_checked_before_stack_overflow() {
        let stderr = "java.lang.OutOfMemoryError\njava.lang.StackOverflowError";
        let verdict = classify(&outcome("", stderr, 1), &requested(&[]), &ArtifactSet::new());
        assert_eq!(verdict, Verdict::OutOfMemory);
    }

    #[test]
    fn missing_requested_artifact_is_flagged() {
        let set = harvested(&[(Artifact::ProverLog, "proof found")]);
        let verdict = classify(
            &outcome("", "", 0),
            &requested(&[RenderFormat::Bussproofs]),
            &set,
        );
        assert_eq!(verdict, Verdict::MissingArtifact);
    }

    #[test]
    fn unrequested_absent_artifact_never_affects_the_verdict() {
        let set = harvested(&[
            (Artifact::ProverLog, "proof found"),
            (Artifact::Rendered(RenderFormat::Bussproofs), "tree"),
        ]);
        let verdict = classify(
            &outcome("", "", 0),
            &requested(&[RenderFormat::Bussproofs]),
            &set,
        );
        assert_eq!(verdict, Verdict::Success);
    }

    #[test]
    fn nonzero_exit_with_contract_satisfied_is_unexpected_error() {
        let set = harvested(&[(Artifact::ProverLog, "something odd")]);
        let verdict = classify(&outcome("", "", 2), &requested(&[]), &set);
        assert_eq!(verdict, Verdict::UnexpectedError);
    }

    #[test]
    fn missing_artifact_checked_before_nonzero_exit() {
        let verdict = classify(
            &outcome("", "", 2),
            &requested(&[RenderFormat::Ebproof]),
            &ArtifactSet::new(),
        );
        assert_eq!(verdict, Verdict::MissingArtifact);
    }

    #[test]
    fn no_requested_formats_and_clean_exit_is_success() {
        let verdict = classify(&outcome("", "", 0), &requested(&[]), &ArtifactSet::new());
        assert_eq!(verdict, Verdict::Success);
    }
}
