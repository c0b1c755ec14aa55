//! Error types module
//!
//! Every fallible client operation returns a [`WatermarkerError`]. The four
//! variants map to distinct failure domains: opening a local file, writing a
//! local file, sending the HTTP request, and a non-200 answer from the service.

use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;

pub type Result<T, E = WatermarkerError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum WatermarkerError {
    #[error("The file '{}' could not be opened", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("The stream could not be copied to the file '{}'", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("An error occurred while sending the request to the watermarker API")]
    Request(#[source] reqwest::Error),

    #[error("The watermarker API returned an error {status}: {body}")]
    Response { status: StatusCode, body: String },
}

impl WatermarkerError {
    /// Numeric error code, stable across releases.
    pub fn code(&self) -> u16 {
        match self {
            WatermarkerError::FileOpen { .. } => 100,
            WatermarkerError::FileWrite { .. } => 110,
            WatermarkerError::Request(_) => 200,
            WatermarkerError::Response { .. } => 300,
        }
    }

    /// Machine-readable error code (e.g. "REQUEST_ERROR")
    pub fn error_code(&self) -> &'static str {
        match self {
            WatermarkerError::FileOpen { .. } => "FILE_OPEN_ERROR",
            WatermarkerError::FileWrite { .. } => "FILE_WRITE_ERROR",
            WatermarkerError::Request(_) => "REQUEST_ERROR",
            WatermarkerError::Response { .. } => "RESPONSE_ERROR",
        }
    }

    /// HTTP status returned by the service, if the error came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            WatermarkerError::Response { status, .. } => Some(*status),
            WatermarkerError::Request(err) => err.status(),
            _ => None,
        }
    }

    /// Local path involved in a file error.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            WatermarkerError::FileOpen { path, .. } | WatermarkerError::FileWrite { path, .. } => {
                Some(path.as_path())
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WatermarkerError {
    fn from(err: reqwest::Error) -> Self {
        WatermarkerError::Request(err)
    }
}

/// Failure to parse a position, format or file mode from its string form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: '{value}' (expected one of: {expected})")]
pub struct ParseOptionError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}
