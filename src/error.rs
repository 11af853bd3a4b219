use thiserror::Error;

/// I/O errors that can occur when reading slide bytes
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// File does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// Path exists but cannot be opened as a file (directory, permissions)
    #[error("Cannot open {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// Any other operating system error while opening or reading
    #[error("Read error on {path}: {message}")]
    Read { path: String, message: String },
}

impl IoError {
    /// Path that could not be opened as a readable file, if any.
    ///
    /// Failures after a successful open (`Read`, `RangeOutOfBounds`) are not
    /// included.
    pub fn not_found_path(&self) -> Option<&str> {
        match self {
            IoError::NotFound(path) | IoError::Unreadable { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Errors related to format detection and slide opening
#[derive(Debug, Clone, Error)]
pub enum FormatError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// TIFF parsing error
    #[error("TIFF error: {0}")]
    Tiff(#[from] TiffError),

    /// File format is not supported
    #[error("Unsupported format: {reason}")]
    UnsupportedFormat { reason: String },
}

impl FormatError {
    /// Path of the slide, if this error means the path does not resolve to
    /// a readable file.
    pub fn not_found_path(&self) -> Option<&str> {
        match self {
            FormatError::Io(e) | FormatError::Tiff(TiffError::Io(e)) => e.not_found_path(),
            _ => None,
        }
    }
}

/// Errors that can occur when parsing TIFF files
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42 (TIFF) or 43 (BigTIFF), got {0}")]
    InvalidVersion(u16),

    /// Invalid BigTIFF offset byte size (must be 8)
    #[error("Invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file or to invalid location)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// Required tag is missing from IFD
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    /// Unknown field type in IFD entry
    #[error("Unknown field type: {0}")]
    UnknownFieldType(u16),
}

/// Errors surfaced by the slide inspector.
///
/// Every variant is terminal: the inspector stops at the first one and the
/// binary exits non-zero.
#[derive(Debug, Error)]
pub enum InspectError {
    /// The slide path does not resolve to a file
    #[error("No such file: {0}")]
    NotFound(String),

    /// The container could not be parsed
    #[error("Cannot open slide: {0}")]
    Format(FormatError),

    /// A queried metadata key is absent from the property map
    #[error("Missing property: {key}")]
    MissingProperty { key: String },

    /// Writing the report failed
    #[error("Failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl From<FormatError> for InspectError {
    fn from(err: FormatError) -> Self {
        match err.not_found_path() {
            Some(path) => InspectError::NotFound(path.to_string()),
            None => InspectError::Format(err),
        }
    }
}
