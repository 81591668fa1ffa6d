//! Board error types

use thiserror::Error;

/// Result type for board operations
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors from board operations
///
/// Index errors are caller bugs (a drag reported a position that does not
/// exist); they are reported instead of panicking so the board survives.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("Index {index} out of range for bucket {bucket} (len {len})")]
    IndexOutOfRange { bucket: String, index: usize, len: usize },

    #[error("Board file error: {0}")]
    File(String),

    #[error("Channel error")]
    ChannelError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BoardError::IndexOutOfRange {
            bucket: "A PREPARAR".to_string(),
            index: 5,
            len: 2,
        };
        assert_eq!(err.to_string(), "Index 5 out of range for bucket A PREPARAR (len 2)");
        assert_eq!(BoardError::ChannelError.to_string(), "Channel error");
    }
}
