use std::fmt;

#[derive(Debug)]
pub enum BookingError {
    #[cfg(feature = "ssr")]
    Http(reqwest::Error),
    Config(String),
    InvalidResponse(String),
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "ssr")]
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {msg}"),
        }
    }
}

impl std::error::Error for BookingError {}

#[cfg(feature = "ssr")]
impl From<reqwest::Error> for BookingError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
