//! Error taxonomy shared by the gateway, the tracker and the console.
//!
//! Every failure that can reach the user is one of three kinds: a client-side
//! precondition that blocked the action before any request went out, a
//! non-success (or malformed) response from the backend, or a transport
//! failure. The console flattens all of them into a single display string.

/// Client-side precondition failures. None of these ever reach the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select a valid CSV file. Only .csv files are supported.")]
    UnsupportedFileType { file_name: String },
    #[error("File size too large. Please select a file smaller than {limit_label}.")]
    FileTooLarge {
        size: u64,
        limit: u64,
        limit_label: String,
    },
    #[error("Unable to read {path}: {reason}")]
    UnreadableFile { path: String, reason: String },
    #[error("{0}")]
    MissingSelection(&'static str),
    #[error("The agent wizard is not open")]
    WizardClosed,
    #[error("Please wait for the current request to finish")]
    Busy,
    #[error("Unknown agent {0}")]
    UnknownAgent(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Non-2xx response, or a 2xx body that did not match the expected schema.
    #[error("{message}")]
    Request { status: u16, message: String },
    /// The request never produced a response.
    #[error("{0}")]
    Network(String),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

impl ConsoleError {
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status,
            message: message.into(),
        }
    }

    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::Network(err.to_string())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Message shown in banners. Empty messages fall back to `fallback`.
    pub fn display_or(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

/// Renders a byte count the way upload limits are phrased to users ("10MB").
pub fn megabytes_label(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    }
}
