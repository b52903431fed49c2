use std::fmt;

/// Everything that can go wrong in the fetch pipeline. Each variant
/// carries a human-readable message; the CLI turns these into a
/// single logged error line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{
    /// No provider matches the URL. No fetch is attempted.
    UnsupportedUrl(String),
    /// The remote site says the release does not exist.
    SourceNotFound(String),
    /// A required DOM element or JSON field is absent.
    MissingData(String),
    /// The HTTP(S) request itself failed.
    NetworkError(String),
    RuntimeError(String),
}

impl fmt::Display for Error
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self
        {
            Error::UnsupportedUrl(msg) => write!(f, "Unsupported URL: {}", msg),
            Error::SourceNotFound(msg) => write!(f, "{}", msg),
            Error::MissingData(msg) => write!(f, "{}", msg),
            Error::NetworkError(msg) => write!(f, "{}", msg),
            Error::RuntimeError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

macro_rules! rterr
{
    ($($x:expr),+) =>
    {
        crate::error::Error::RuntimeError(format!($($x),+))
    };
}

macro_rules! neterr
{
    ($($x:expr),+) =>
    {
        crate::error::Error::NetworkError(format!($($x),+))
    };
}

macro_rules! dataerr
{
    ($($x:expr),+) =>
    {
        crate::error::Error::MissingData(format!($($x),+))
    };
}
