use std::fmt;

use bf_core::RemoteCallFailed;

/// Typed error for calls to the generation service.
///
/// Every variant is a `RemoteCallFailed` from the session's point of view; the
/// categories only matter for the log.
#[derive(Debug)]
pub enum GenerationError {
    /// Network-level failure (DNS, connection, timeout)
    Network(String),
    /// Service returned a non-success HTTP status
    Api { status: u16, body: String },
    /// Response body was not the expected JSON
    Parse(String),
    /// Configured base URL cannot carry endpoint paths
    Config(String),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::Network(msg) => write!(f, "Network error: {}", msg),
            GenerationError::Api { status, body } => write!(f, "API error {}: {}", status, body),
            GenerationError::Parse(msg) => write!(f, "Parse error: {}", msg),
            GenerationError::Config(msg) => write!(f, "Invalid API URL: {}", msg),
        }
    }
}

impl std::error::Error for GenerationError {}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(e: serde_json::Error) -> Self {
        GenerationError::Parse(e.to_string())
    }
}

impl From<GenerationError> for RemoteCallFailed {
    fn from(e: GenerationError) -> Self {
        RemoteCallFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_api() {
        let e = GenerationError::Api { status: 502, body: "bad gateway".into() };
        assert_eq!(e.to_string(), "API error 502: bad gateway");
    }

    #[test]
    fn display_network() {
        let e = GenerationError::Network("timeout".into());
        assert_eq!(e.to_string(), "Network error: timeout");
    }

    #[test]
    fn display_parse() {
        let e = GenerationError::Parse("missing field `node_id`".into());
        assert_eq!(e.to_string(), "Parse error: missing field `node_id`");
    }

    #[test]
    fn display_config() {
        let e = GenerationError::Config("mailto:x cannot be a base".into());
        assert_eq!(e.to_string(), "Invalid API URL: mailto:x cannot be a base");
    }

    #[test]
    fn json_error_becomes_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(GenerationError::from(err), GenerationError::Parse(_)));
    }

    #[test]
    fn converts_to_remote_call_failed() {
        let failed: RemoteCallFailed = GenerationError::Api { status: 404, body: "nope".into() }.into();
        assert_eq!(failed.0, "API error 404: nope");
    }
}
