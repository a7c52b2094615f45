use thiserror::Error;

/// Misconfiguration detected before any record is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("batch deadline must be greater than zero")]
    ZeroDeadline,
}
