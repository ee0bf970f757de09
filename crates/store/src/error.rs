use thiserror::Error;

use crate::id::PixelId;
use crate::types::PixelLoc;

/// Errors that can occur when reading or writing a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A pixel already occupies the coordinate.
    #[error("a pixel already exists at {0}")]
    Conflict(PixelLoc),
    /// No pixel carries the id.
    #[error("pixel {0} does not exist")]
    NotFound(PixelId),
    /// A writer panicked while holding the store lock.
    #[error("store lock was poisoned")]
    Poisoned,
    /// A failed journal write could not be rolled back; the store refuses further writes.
    #[error("journal is in an unknown state after a failed write, restart to recover")]
    Halted,
    /// A complete journal record could not be decoded.
    #[error("journal record on line {line} is corrupt: {source}")]
    Corrupt {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
