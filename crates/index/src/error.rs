//! Error types for Tanoak index operations.

use core::fmt;

/// Result type alias for index operations.
pub type Result<T> = core::result::Result<T, IndexError>;

/// Error types for index operations.
///
/// `LengthMismatch` is a caller error; the other construction and query
/// variants indicate an internal defect, not bad input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexError {
    /// Key and value batches differ in length.
    LengthMismatch { keys: usize, values: usize },
    /// More entries were written into a node than the fan-out allows.
    NodeOverflow { fan_out: usize },
    /// A lower-bound search failed on a built tree.
    SearchFailed,
    /// The operation is not implemented.
    Unsupported { operation: &'static str },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::LengthMismatch { keys, values } => {
                write!(
                    f,
                    "keys and values must be the same length: {} keys, {} values",
                    keys, values
                )
            }
            IndexError::NodeOverflow { fan_out } => {
                write!(
                    f,
                    "attempting to store more elements in node than fan-out ({})",
                    fan_out
                )
            }
            IndexError::SearchFailed => write!(f, "node binary search failed"),
            IndexError::Unsupported { operation } => {
                write!(f, "operation not supported: {}", operation)
            }
        }
    }
}

impl IndexError {
    /// Creates a length mismatch error.
    pub fn length_mismatch(keys: usize, values: usize) -> Self {
        IndexError::LengthMismatch { keys, values }
    }

    /// Creates a node overflow error.
    pub fn node_overflow(fan_out: usize) -> Self {
        IndexError::NodeOverflow { fan_out }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(operation: &'static str) -> Self {
        IndexError::Unsupported { operation }
    }
}
