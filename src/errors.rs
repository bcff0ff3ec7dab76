use std::{fmt, io, str::Utf8Error};
use quick_xml::events::attributes::AttrError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input could not be opened, read, decompressed or parsed as XML.
    Parse,
    Config,
    Io,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
        }
    }

    pub fn parse(value: impl fmt::Display) -> Self {
        Error::new(ErrorKind::Parse, value.to_string())
    }

    pub fn config(value: impl fmt::Display) -> Self {
        Error::new(ErrorKind::Config, value.to_string())
    }

    pub fn is_parse(&self) -> bool {
        self.kind == ErrorKind::Parse
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::new(ErrorKind::Io, value.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(value: quick_xml::Error) -> Self {
        Error::parse(value)
    }
}

impl From<AttrError> for Error {
    fn from(value: AttrError) -> Self {
        Error::parse(value)
    }
}

impl From<Utf8Error> for Error {
    fn from(value: Utf8Error) -> Self {
        Error::parse(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::config(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_errors_are_parse_errors() {
        let err: Error = AttrError::Duplicated(3, 0).into();
        assert!(err.is_parse());
        assert!(!err.message.is_empty());
    }

    #[test]
    fn io_errors_keep_their_description() {
        let err: Error = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed").into();
        assert_eq!(err.kind, ErrorKind::Io);
        assert_eq!(err.to_string(), "pipe closed");
    }
}
