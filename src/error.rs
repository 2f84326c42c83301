use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::io;
use std::result;

use attohttpc::StatusCode;

/// The ways a redirection response can be unusable.
#[derive(Debug)]
#[non_exhaustive]
pub enum InvalidResponseKind {
    /// A redirection response is missing its `Location` header.
    LocationHeader,
    /// The `Location` header of a redirection cannot be turned into a URL.
    RedirectionUrl,
}

impl Display for InvalidResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use InvalidResponseKind::*;

        match self {
            LocationHeader => write!(f, "missing or invalid location header"),
            RedirectionUrl => write!(f, "invalid redirection url"),
        }
    }
}

/// Common errors that can occur while locating the environment or fetching a URL.
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The HTTP exchange failed: connection, TLS, malformed response or invalid header value.
    Http(attohttpc::Error),
    /// IO Error
    Io(io::Error),
    /// The URL is invalid or uses a scheme other than http and https.
    InvalidBaseUrl,
    /// A redirection could not be followed.
    InvalidResponse(InvalidResponseKind),
    /// Too many redirections
    TooManyRedirections,
    /// A non-success status code was turned into an error.
    StatusCode(StatusCode),
    /// The located environment file could not be read.
    EnvFile(dotenvy::Error),
    /// The session value is missing and a session is required.
    MissingSession(String),
}

/// A type that contains all the errors that can possibly occur while locating the environment file
/// or fetching a URL.
#[derive(Debug)]
pub struct Error(pub(crate) Box<ErrorKind>);

impl Error {
    /// Get a reference to the `ErrorKind` inside.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume this `Error` and get the `ErrorKind` inside.
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }
}

impl Display for Error {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        use ErrorKind::*;

        match *self.0 {
            Http(ref e) => write!(w, "Http Error: {e}"),
            Io(ref e) => write!(w, "Io Error: {e}"),
            InvalidBaseUrl => write!(w, "Invalid base URL"),
            InvalidResponse(ref k) => write!(w, "InvalidResponse: {k}"),
            TooManyRedirections => write!(w, "Too many redirections"),
            StatusCode(ref sc) => write!(w, "Status code {sc} indicates failure"),
            EnvFile(ref e) => write!(w, "Env file error: {e}"),
            MissingSession(ref key) => write!(w, "Session value {key} is not set"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        use ErrorKind::*;

        match *self.0 {
            Io(ref e) => Some(e),
            Http(ref e) => Some(e),
            EnvFile(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(err: ErrorKind) -> Error {
        Error(Box::new(err))
    }
}

impl From<InvalidResponseKind> for Error {
    fn from(kind: InvalidResponseKind) -> Error {
        ErrorKind::InvalidResponse(kind).into()
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error(Box::new(ErrorKind::Io(err)))
    }
}

/// Status errors from `Response::error_for_status` keep their code; everything else is `Http`.
impl From<attohttpc::Error> for Error {
    fn from(err: attohttpc::Error) -> Error {
        match err.kind() {
            attohttpc::ErrorKind::StatusCode(code) => ErrorKind::StatusCode(*code).into(),
            _ => ErrorKind::Http(err).into(),
        }
    }
}

impl From<dotenvy::Error> for Error {
    fn from(err: dotenvy::Error) -> Error {
        Error(Box::new(ErrorKind::EnvFile(err)))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

/// Wrapper for the `Result` type with an `Error`.
pub type Result<T = ()> = result::Result<T, Error>;
