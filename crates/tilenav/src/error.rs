//! Error types for the engine.

/// Errors reported by mesh construction and queries.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A parameter was out of range or a reference did not resolve.
    #[error("invalid parameter")]
    InvalidParam,
    /// No qualifying polygon was found.
    #[error("no polygon found")]
    NotFound,
    /// The requested tile slot is already occupied.
    #[error("tile slot already occupied")]
    AlreadyOccupied,
    /// Tile data did not start with the expected magic value.
    #[error("wrong tile data magic")]
    WrongMagic,
    /// Tile data carried an unsupported version.
    #[error("unsupported tile data version {0}")]
    WrongVersion(u32),
    /// Tile data was structurally invalid.
    #[error("malformed tile data: {0}")]
    MalformedTile(&'static str),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
