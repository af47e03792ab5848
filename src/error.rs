//! Error types for the BOLD setup utilities

use thiserror::Error;

/// Main error type for setup runs
///
/// Every variant is fatal for the current batch. The variants are grouped into
/// four categories (see [`ErrorCategory`]) that decide the process exit code.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required setting: {0}")]
    MissingField(&'static str),

    #[error("Invalid amount for {field}: {value:?} is not a base-10 unsigned 256-bit integer")]
    InvalidAmount { field: &'static str, value: String },

    #[error("Invalid address for {field}: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("RPC error during {operation}: {message}")]
    Rpc { operation: String, message: String },

    #[error("Timeout waiting for {operation}")]
    Timeout { operation: String },

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Invalid private key at position {index}: {message}")]
    InvalidPrivateKey { index: usize, message: String },

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Transaction with nonce {nonce} was not accepted: {message}")]
    Submission { nonce: u64, message: String },
}

/// Coarse classification of a [`SetupError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Operator input problems, detected before any network call
    Configuration,
    /// Connection failures and failed read-only queries
    Network,
    /// Malformed key material or signer failure
    Signing,
    /// The node rejected a broadcast transaction
    Submission,
}

impl SetupError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SetupError::Config(_)
            | SetupError::MissingField(_)
            | SetupError::InvalidAmount { .. }
            | SetupError::InvalidAddress { .. } => ErrorCategory::Configuration,
            SetupError::Rpc { .. } | SetupError::Timeout { .. } | SetupError::Contract(_) => {
                ErrorCategory::Network
            }
            SetupError::InvalidPrivateKey { .. } | SetupError::Signing(_) => {
                ErrorCategory::Signing
            }
            SetupError::Submission { .. } => ErrorCategory::Submission,
        }
    }

    /// Check if error is retryable
    ///
    /// Only transport-level failures of read-only queries qualify. Operator
    /// mistakes and submission failures never do.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SetupError::Rpc { .. } | SetupError::Timeout { .. })
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::Signing => 3,
            ErrorCategory::Network => 4,
            ErrorCategory::Submission => 5,
        }
    }

    pub(crate) fn rpc(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        SetupError::Rpc {
            operation: operation.into(),
            message: err.to_string(),
        }
    }
}

/// Result type for setup operations
pub type SetupResult<T> = Result<T, SetupError>;
