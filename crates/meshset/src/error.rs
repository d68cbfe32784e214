//! Error kinds for mesh-set loading and path queries.
//!
//! Errors carry only their kind. Callers branch on the variant; message
//! formatting is a presentation concern left to them.

/// Failures reported by the loader and the session operations.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The mesh-set file could not be opened.
    #[error("mesh-set file not found")]
    FileNotFound,
    /// The file ended inside the mesh-set header.
    #[error("truncated mesh-set header")]
    TruncatedHeader,
    /// The file ended inside a tile header.
    #[error("truncated tile header")]
    TruncatedTileHeader,
    /// The file ended inside a tile payload.
    #[error("truncated tile data")]
    TruncatedTileData,
    /// Magic tag or version did not match.
    #[error("unsupported mesh-set format")]
    UnsupportedFormat,
    /// The engine rejected the embedded mesh parameters.
    #[error("navigation mesh initialization failed")]
    MeshInitFailed,
    /// No qualifying polygon near the query point.
    #[error("no polygon near query point")]
    PolyNotFound,
    /// Graph search found no connecting route.
    #[error("no path between points")]
    NoPath,
    /// An engine query failed for a reason not otherwise classified.
    #[error("navigation query failed")]
    QueryFailed,
}

/// Result type for mesh-set operations.
pub type Result<T> = std::result::Result<T, Error>;
