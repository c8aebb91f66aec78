//! Error types for ChitraMap

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// ChitraMap error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A protocol record could not be decoded
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Cell coordinate outside the grid
    #[error("Cell ({x}, {y}) is outside the {size}x{size} grid")]
    OutOfBounds {
        /// Array-space column
        x: i32,
        /// Array-space row
        y: i32,
        /// Grid side length
        size: usize,
    },

    /// Cell value that is neither a probability nor the path sentinel
    #[error("Illegal value {value} for cell ({x}, {y})")]
    InvalidCellValue {
        /// Array-space column
        x: i32,
        /// Array-space row
        y: i32,
        /// Rejected value
        value: f32,
    },

    /// Static map bounds do not fit the grid
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// Data file or connection could not be opened
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Operation not supported by the active source
    #[error("Operation not supported: {0}")]
    UnsupportedOperation(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration load or parse error
    #[error("Config error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
