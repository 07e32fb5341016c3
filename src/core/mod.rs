// Public modules
pub mod artifact;
pub mod bom;
pub mod chain;
pub mod client;
pub mod config;
pub mod design;
pub mod identity;
pub mod package;
pub mod paths;
pub mod pipeline;
pub mod remote;
pub mod tool;

// Re-export common types for convenience
pub use artifact::{ArtifactKind, GeneratedArtifact};
pub use chain::{ChainOutcome, CommandVariant};
pub use client::AssetClient;
pub use config::Config;
pub use design::DesignFiles;
pub use identity::DesignIdentity;
pub use pipeline::{Outcome, Pipeline, RunReport, Stage};
pub use remote::RemoteRecord;
