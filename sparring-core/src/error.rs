//! Sparring core error type.

use std::error;
use std::fmt::{self, Display};
use std::io;
use std::result;

/// Sparring core generic result type.
pub type Result<T> = result::Result<T, Error>;

/// A list specifying general errors for the sparring core.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Engine has not answered the readiness probe yet.
    EngineNotReady,
    /// Writing to or reading from the engine failed.
    EngineIo,
    /// Engine process could not be started.
    EngineSpawn,
    /// Engine process has exited or closed its input.
    EngineClosed,

    /// A timer or input thread could not be started.
    ThreadSpawn,

    /// More moves were asked to be removed than the ledger holds.
    LedgerInsufficientHistory,

    /// Square parse string malformed.
    ParseSquareMalformed,
    /// Move parse string malformed.
    ParseMoveMalformed,
    /// FEN string malformed or not a legal position.
    ParseFenMalformed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EngineNotReady => "engine not ready",
            ErrorKind::EngineIo => "engine io",
            ErrorKind::EngineSpawn => "engine spawn",
            ErrorKind::EngineClosed => "engine closed",

            ErrorKind::ThreadSpawn => "thread spawn",

            ErrorKind::LedgerInsufficientHistory => "ledger insufficient history",

            ErrorKind::ParseSquareMalformed => "parse square malformed",
            ErrorKind::ParseMoveMalformed => "parse move malformed",
            ErrorKind::ParseFenMalformed => "parse fen malformed",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The primary and general error type for the sparring core.
#[derive(Debug)]
pub enum Error {
    Simple(ErrorKind),
    Message(ErrorKind, String),
    Custom(ErrorKind, Box<dyn error::Error + Send + Sync>),
}

impl Error {
    pub fn new<E>(error_kind: ErrorKind, inner_error: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self::Custom(error_kind, inner_error.into())
    }

    /// Returns the kind of this error, regardless of attached context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Simple(error_kind)
            | Error::Message(error_kind, _)
            | Error::Custom(error_kind, _) => *error_kind,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Simple(error_kind) => {
                write!(f, "{error_kind}")
            }
            Error::Message(error_kind, string) => {
                write!(f, "{error_kind}: {string}")
            }
            Error::Custom(error_kind, ref box_error) => {
                write!(f, "{error_kind}, error: {}", *box_error)
            }
        }
    }
}

impl error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(error_kind: ErrorKind) -> Self {
        Self::Simple(error_kind)
    }
}

/// Io errors only arise on the engine pipes.
impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::Custom(ErrorKind::EngineIo, error.into())
    }
}

impl<S: ToString> From<(ErrorKind, S)> for Error {
    fn from((error_kind, stringable): (ErrorKind, S)) -> Self {
        Self::Message(error_kind, stringable.to_string())
    }
}
