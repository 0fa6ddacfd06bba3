//! Error types for mesh import and sampling.

use thiserror::Error;

/// Mesh crate error type.
#[derive(Error, Debug)]
pub enum MeshError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// OBJ parse error
    #[error("OBJ parse error: {0}")]
    Obj(#[from] tobj::LoadError),

    /// Texture decode error
    #[error("Texture decode error: {0}")]
    Texture(#[from] image::ImageError),

    /// No importer is registered for the file extension
    #[error("Unsupported mesh format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias using our MeshError type.
pub type Result<T> = std::result::Result<T, MeshError>;
