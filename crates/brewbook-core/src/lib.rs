use thiserror::Error;

/// Workspace-wide result alias.
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Version tag written into backups and machine-readable output so tooling
/// can detect incompatible data files.
pub const SCHEMA_VERSION: u32 = 1;

/// Lightweight error type for crates that need a typed failure instead of
/// an eyre report.
#[derive(Debug, Error)]
pub enum BrewbookError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("{0}")]
    Other(String),
}
