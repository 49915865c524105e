//! Error types for Furrow.

use thiserror::Error;

/// Construction-time world errors.
///
/// These are the only fatal conditions in the simulation core: anything that
/// happens after a grid exists is reported as a declined action instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    /// Width or height is zero
    #[error("invalid grid dimensions {width}x{height}: both must be positive")]
    InvalidDimensions {
        /// Requested width in tiles
        width: u32,
        /// Requested height in tiles
        height: u32,
    },

    /// Tile size is zero, negative, or not finite
    #[error("invalid tile size {0}: must be positive and finite")]
    InvalidTileSize(f32),

    /// Dirt patch radius range is empty
    #[error("invalid dirt patch radius range {min}..={max}")]
    InvalidDirtRadius {
        /// Smallest radius
        min: u32,
        /// Largest radius
        max: u32,
    },

    /// Supplied tile buffer does not match the dimensions
    #[error("tile buffer has {actual} tiles, expected {expected}")]
    TileCountMismatch {
        /// width * height
        expected: usize,
        /// Length of the supplied buffer
        actual: usize,
    },

    /// Layout rows have differing lengths
    #[error("layout row {row} has {actual} columns, expected {expected}")]
    RaggedLayout {
        /// Offending row
        row: usize,
        /// Columns in the first row
        expected: usize,
        /// Columns in the offending row
        actual: usize,
    },

    /// Unknown glyph in a text layout
    #[error("unknown layout glyph {glyph:?} at ({col}, {row})")]
    UnknownGlyph {
        /// The unrecognized character
        glyph: char,
        /// Column
        col: usize,
        /// Row
        row: usize,
    },
}

/// Result type alias for world construction.
pub type WorldResult<T> = Result<T, WorldError>;
