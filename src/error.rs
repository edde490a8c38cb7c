use std::fmt;

/// Failure kinds surfaced by sequence operations.
#[derive(Debug)]
pub enum Error {
    /// A constructor rejected its arguments.
    InvalidArgument(String),
    /// `reduce` without a seed found no elements.
    EmptySequence,
    /// A producer gave up mid-emission.
    Producer(Box<dyn std::error::Error>),
}

impl Error {
    pub fn producer<E: Into<Box<dyn std::error::Error>>>(err: E) -> Self {
        Error::Producer(err.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(message) => write!(f, "invalid argument: {}", message),
            Error::EmptySequence => write!(f, "reduce of empty sequence with no initial value"),
            Error::Producer(err) => write!(f, "producer failed: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Producer(err) => Some(&**err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
