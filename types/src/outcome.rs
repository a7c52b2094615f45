//! Per-operation outcomes and the reasons a batch can be cut short.

use std::fmt;

use serde::Serialize;

/// Result of a single delayable operation.
///
/// Cancellation is an expected result, not an error: a `Cancelled` operation
/// never performed its side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The nominal duration elapsed and the side effect ran.
    Completed,
    /// The signal fired first; the side effect was skipped.
    Cancelled,
}

impl Outcome {
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two operations run for every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Fast local write of the record into the output file.
    Write,
    /// Slower remote update of the record in the database.
    Update,
}

impl OperationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::Update => "update",
        }
    }

    /// Human-readable description of the side effect, used in log lines.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::Write => "adding record to new file",
            Self::Update => "updating record in database",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a cancellation signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The batch deadline timer elapsed.
    DeadlineElapsed,
    /// Someone asked for cancellation explicitly (e.g. Ctrl+C).
    Requested,
}

impl CancelReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeadlineElapsed => "deadline elapsed",
            Self::Requested => "cancellation requested",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
