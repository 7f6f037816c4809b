//! Error type of the unified cipher contract.

/// Failures surfaced to callers of the engine.
///
/// Contract violations are rejected at the API boundary before any backend
/// state, register included, is touched. Hardware faults are reported, never
/// silently retried: a half-fed cipher operation must not be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A key or data buffer had the wrong length.
    #[error("{context}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Which argument was malformed.
        context: &'static str,
        /// The length the contract requires.
        expected: usize,
        /// The length actually supplied.
        actual: usize,
    },
    /// The cipher peripheral did not finish within its poll budget.
    #[error("cipher peripheral did not finish within {polls} status polls")]
    HardwareTimeout {
        /// Number of status polls spent before giving up.
        polls: u32,
    },
    /// A non-blocking request found the singleton engine mid-operation.
    #[error("cipher engine is busy with another operation")]
    Busy,
}

impl From<mesh_aes_hw::Error> for Error {
    fn from(err: mesh_aes_hw::Error) -> Self {
        match err {
            mesh_aes_hw::Error::Timeout { polls } => Self::HardwareTimeout { polls },
            mesh_aes_hw::Error::Busy => Self::Busy,
        }
    }
}

/// Result alias for engine operations.
pub type Result<T> = core::result::Result<T, Error>;
