//! Error types for setting up combat targets and loading config.

use physics::RagdollError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CombatError {
    #[error("could not build ragdoll: {0}")]
    Ragdoll(#[from] RagdollError),
    #[error("invalid combat config: {0}")]
    Config(#[from] ron::error::SpannedError),
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
