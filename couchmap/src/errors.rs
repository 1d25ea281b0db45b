use backtrace::Backtrace;
use serde::{de, ser};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for couchmap operations.
///
/// Each kind describes one category of failure so callers can match on it
/// instead of parsing messages.
///
/// # Examples
///
/// ```rust,ignore
/// use couchmap::errors::{CouchmapError, ErrorKind, CouchmapResult};
///
/// fn example() -> CouchmapResult<()> {
///     Err(CouchmapError::new("No mapping metadata for User", ErrorKind::ObjectMappingError))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Mapping Errors
    /// Error mapping an entity to or from a document
    ObjectMappingError,
    /// Entity metadata is inconsistent (raised when metadata is built)
    ConfigurationError,

    // Encoding Errors
    /// Error encoding or decoding the text representation of a document
    EncodingError,

    // Query Errors
    /// No execution rule matched the declared return shape of a query method
    UnsupportedShape,
    /// The store reported a failure while executing a query
    QueryError,

    // Document Errors
    /// The identifier is missing or not usable as a document key
    InvalidId,
    /// The requested document does not exist
    DocumentNotFound,
    /// A document with the same id already exists
    DocumentExists,
    /// The version (CAS) supplied does not match the stored one
    CasMismatch,

    // Index Errors
    /// Failed to verify or create an index
    IndexingError,

    /// The operation is not valid in the current context
    InvalidOperation,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::UnsupportedShape => write!(f, "Unsupported shape"),
            ErrorKind::QueryError => write!(f, "Query error"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::DocumentNotFound => write!(f, "Document not found"),
            ErrorKind::DocumentExists => write!(f, "Document exists"),
            ErrorKind::CasMismatch => write!(f, "CAS mismatch"),
            ErrorKind::IndexingError => write!(f, "Indexing error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom couchmap error type.
///
/// `CouchmapError` carries a message, a kind, an optional cause and the
/// backtrace captured where it was created.
///
/// # Examples
///
/// ```rust,ignore
/// use couchmap::errors::{CouchmapError, ErrorKind};
///
/// let cause = CouchmapError::new("trailing characters", ErrorKind::EncodingError);
/// let err = CouchmapError::new_with_cause(
///     "Could not translate to JSON while converting User",
///     ErrorKind::ObjectMappingError,
///     cause,
/// );
/// ```
#[derive(Clone)]
pub struct CouchmapError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<CouchmapError>>,
    backtrace: Atomic<Backtrace>,
}

impl CouchmapError {
    /// Creates a new `CouchmapError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        CouchmapError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `CouchmapError` wrapping a cause error.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: CouchmapError) -> Self {
        CouchmapError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&CouchmapError> {
        self.cause.as_deref()
    }
}

impl Display for CouchmapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for CouchmapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for CouchmapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for couchmap operations.
pub type CouchmapResult<T> = Result<T, CouchmapError>;

impl de::Error for CouchmapError {
    fn custom<T: Display>(msg: T) -> Self {
        CouchmapError::new(&msg.to_string(), ErrorKind::EncodingError)
    }
}

impl ser::Error for CouchmapError {
    fn custom<T: Display>(msg: T) -> Self {
        CouchmapError::new(&msg.to_string(), ErrorKind::EncodingError)
    }
}

impl From<serde_json::Error> for CouchmapError {
    fn from(err: serde_json::Error) -> Self {
        CouchmapError::new(&format!("JSON error: {}", err), ErrorKind::EncodingError)
    }
}

impl From<String> for CouchmapError {
    fn from(msg: String) -> Self {
        CouchmapError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for CouchmapError {
    fn from(msg: &str) -> Self {
        CouchmapError::new(msg, ErrorKind::InternalError)
    }
}
