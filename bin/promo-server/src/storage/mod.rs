//! Temporary on-disk storage for generated artifacts.

pub mod artifacts;

pub use artifacts::{ArtifactStore, StorageError, StoredArtifact, artifact_name};
