use std::fmt;

/// Machine-readable error codes for navigation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidBaseUrl,
    LocationRejected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::InvalidBaseUrl => "E1004",
            Self::LocationRejected => "E4001",
        }
    }

    /// Short human-facing summary for logs.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidBaseUrl => "Invalid report base URL",
            Self::LocationRejected => "Host rejected navigation target",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in the reportnav config file and retry."),
            Self::InvalidBaseUrl => {
                Some("Set `history.base_url` to an absolute URL such as http://localhost:9323/.")
            }
            Self::LocationRejected => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors surfaced by the navigation layer.
///
/// Parsing and link building are total and never produce these; only the
/// host boundary and configuration do.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// The host navigation primitive refused a target.
    #[error("{code}: cannot navigate to {target:?}: {reason}", code = ErrorCode::LocationRejected)]
    LocationRejected { target: String, reason: String },

    /// The configured base URL is not an absolute URL.
    #[error("{code}: invalid base url {url:?}: {reason}", code = ErrorCode::InvalidBaseUrl)]
    InvalidBaseUrl { url: String, reason: String },
}

impl NavError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::LocationRejected { .. } => ErrorCode::LocationRejected,
            Self::InvalidBaseUrl { .. } => ErrorCode::InvalidBaseUrl,
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
