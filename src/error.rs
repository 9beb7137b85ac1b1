//! Contains the error type for handling I/O and Errno errors
use std::fmt;
use std::io;

/// The error type for editor errors that can arise from I/O related errors
/// or Errno when using the nix-rust library.
#[derive(Debug)]
#[non_exhaustive]
pub enum EditorError {
    /// I/O Error
    Io(io::Error),
    /// EOF (Ctrl-D on an empty buffer, or EOF on a non-tty stream)
    Eof,
    /// Ctrl-C
    Interrupted,
    /// Invalid UTF-8 was read from the terminal
    Utf8Error,
    /// Unix error from a syscall
    #[cfg(unix)]
    Errno(nix::Error),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::Io(err) => err.fmt(f),
            EditorError::Eof => write!(f, "EOF"),
            EditorError::Interrupted => write!(f, "Interrupted"),
            EditorError::Utf8Error => write!(f, "invalid utf-8: corrupt contents"),
            #[cfg(unix)]
            EditorError::Errno(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditorError::Io(err) => Some(err),
            #[cfg(unix)]
            EditorError::Errno(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for EditorError {
    fn from(err: io::Error) -> EditorError {
        EditorError::Io(err)
    }
}

#[cfg(unix)]
impl From<nix::Error> for EditorError {
    fn from(err: nix::Error) -> EditorError {
        EditorError::Errno(err)
    }
}

/// Specialized [`Result`](std::result::Result) type for this crate's operations.
pub type Result<T> = std::result::Result<T, EditorError>;
