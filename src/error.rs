use std::io;
use thiserror::Error;

use crate::types::{Generation, RecordMode};

#[derive(Error, Debug)]
pub enum RecordError {
    /// The buffer does not have the box or party length of the requested
    /// generation. No record is produced.
    #[error("Invalid length {actual} for {generation:?} {mode:?} record (expected {expected})")]
    InvalidLength {
        generation: Generation,
        mode:       RecordMode,
        expected:   usize,
        actual:     usize,
    },
    #[error("Buffer length {0} matches neither the box nor the party size of {1:?}")]
    UnknownLength(usize, Generation),
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Malformed data table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_length() {
        let err = RecordError::InvalidLength {
            generation: Generation::IV,
            mode:       RecordMode::Box,
            expected:   136,
            actual:     100,
        };
        assert_eq!(
            err.to_string(),
            "Invalid length 100 for IV Box record (expected 136)"
        );
    }
}
