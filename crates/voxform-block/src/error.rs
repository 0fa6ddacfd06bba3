//! Error types for palette loading, assignment, and export.

use thiserror::Error;

/// Block crate error type.
#[derive(Error, Debug)]
pub enum BlockError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Atlas/palette parse or JSON export error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary export encode error
    #[error("Binary encode error: {0}")]
    Encode(#[from] bincode::Error),

    /// Every palette entry was excluded
    #[error("No blocks remain in the palette after exclusions")]
    PaletteExhausted,

    /// The block palette selects no blocks from the atlas
    #[error("Palette selects no blocks from the atlas")]
    EmptyPalette,
}

/// Result type alias using our BlockError type.
pub type Result<T> = std::result::Result<T, BlockError>;
