//! Entity cache error types.

/// Kinds of entity cache errors.
///
/// Only attachment enrichment can fail; entity merges never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CacheErrorKind {
    /// The attachment request could not be completed.
    #[display("Failed to fetch {}: {}", url, message)]
    Fetch {
        /// Source URL of the attachment.
        url: String,
        /// Transport error message.
        message: String,
    },
    /// The attachment host answered with a non-success status.
    #[display("Fetching {} returned HTTP {}", url, status)]
    HttpStatus {
        /// Source URL of the attachment.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The HTTP client could not be constructed.
    #[display("Failed to build HTTP client: {}", _0)]
    ClientBuild(String),
}

/// Entity cache error with location tracking.
///
/// # Examples
///
/// ```
/// use herald_error::{CacheError, CacheErrorKind};
///
/// let err = CacheError::new(CacheErrorKind::HttpStatus {
///     url: "https://cdn.example/a.png".to_string(),
///     status: 404,
/// });
/// assert!(format!("{}", err).contains("HTTP 404"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cache Error: {} at line {} in {}", kind, line, file)]
pub struct CacheError {
    /// The kind of error that occurred
    pub kind: CacheErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CacheError {
    /// Create a new cache error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CacheErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for entity cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
