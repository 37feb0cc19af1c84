//! Artifact vocabulary and best-effort harvesting.
//!
//! The prover writes its outputs into the workspace under fixed file names.
//! That naming is a versioned contract: the harvester probes the expected
//! paths after the process has been reaped and reads whatever exists. A
//! missing file is not an error here; whether its absence matters is decided
//! by the classifier.

use std::collections::BTreeMap;
use std::fs;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::workspace::Workspace;

/// Proof-tree rendering styles the prover knows how to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    Bussproofs,
    Ebproof,
}

impl RenderFormat {
    pub const ALL: [RenderFormat; 2] = [RenderFormat::Bussproofs, RenderFormat::Ebproof];

    pub fn as_str(self) -> &'static str {
        match self {
            RenderFormat::Bussproofs => "bussproofs",
            RenderFormat::Ebproof => "ebproof",
        }
    }
}

impl FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bussproofs" => Ok(RenderFormat::Bussproofs),
            "ebproof" => Ok(RenderFormat::Ebproof),
            other => Err(format!("unknown render format: {other}")),
        }
    }
}

/// Everything the prover may leave behind in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Artifact {
    /// Primary diagnostic log, expected on any healthy run.
    ProverLog,
    /// The parsed and normalized form of the input sequent.
    NormalizedInput,
    /// A rendered proof tree in the given style.
    Rendered(RenderFormat),
}

impl Artifact {
    /// Relative path of this artifact inside the workspace.
    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::ProverLog => "prover.log",
            Artifact::NormalizedInput => "normalized.sq",
            Artifact::Rendered(RenderFormat::Bussproofs) => "proof.bussproofs.tex",
            Artifact::Rendered(RenderFormat::Ebproof) => "proof.ebproof.tex",
        }
    }
}

/// Artifacts found in a workspace, keyed by name; absent files are omitted.
pub type ArtifactSet = BTreeMap<Artifact, String>;

/// Read every artifact in `vocabulary` that exists in the workspace.
///
/// Whole-file text reads; outputs are small by contract (the prover is given
/// an output-size ceiling at invocation time). Must only be called once the
/// process has been reaped, so no writer races the reads.
pub fn harvest(ws: &Workspace, vocabulary: &[Artifact]) -> ArtifactSet {
    let mut set = ArtifactSet::new();
    for &artifact in vocabulary {
        if let Ok(contents) = fs::read_to_string(ws.path().join(artifact.file_name())) {
            set.insert(artifact, contents);
        }
    }
    set
}
