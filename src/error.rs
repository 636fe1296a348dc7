//! Error types for the NameSilo client library.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, NameSiloError>;

/// Comprehensive error type for all NameSilo API operations
#[derive(Error, Debug)]
pub enum NameSiloError {
    /// Network or HTTP-related errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// XML parsing errors
    #[error("XML parsing error: {0}")]
    XmlParsing(#[from] quick_xml::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    UrlParsing(#[from] url::ParseError),

    /// The endpoint answered with a non-200 HTTP status
    #[error("HTTP status {status} returned by NameSilo")]
    HttpStatus { status: u16 },

    /// The reply carried a non-success reply code
    #[error("NameSilo API error {code}: {message}{}", detail_suffix(.detail))]
    Api {
        code: u16,
        message: String,
        detail: String,
    },

    /// No API key was configured
    #[error("No API key provided")]
    MissingApiKey,

    /// Invalid input provided
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// A field the operation depends on is absent from the reply
    #[error("Missing field in reply: {field}")]
    MissingField { field: String },

    /// A field is present but could not be interpreted
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    /// Generic error for replies that do not look like NameSilo replies
    #[error("Unexpected API response: {message}")]
    UnexpectedResponse { message: String },
}

/// ` (detail)`, or nothing when NameSilo sent no detail
fn detail_suffix(detail: &str) -> String {
    if detail.trim().is_empty() {
        String::new()
    } else {
        format!(" ({})", detail.trim())
    }
}

impl NameSiloError {
    /// Create a new API error from a reply code
    pub fn api(code: u16, message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
            detail: detail.into(),
        }
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a new invalid value error
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a new unexpected response error
    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            message: message.into(),
        }
    }

    /// The NameSilo reply code, if this error came from one
    pub fn reply_code(&self) -> Option<u16> {
        match self {
            NameSiloError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check if this error is temporary and the request may be re-submitted
    pub fn is_retryable(&self) -> bool {
        match self {
            NameSiloError::Network(_) => true,
            NameSiloError::HttpStatus { status } => *status >= 500,
            // 115: registry not responding, 400: previous request still processing
            NameSiloError::Api { code, .. } => matches!(code, 115 | 400),
            _ => false,
        }
    }

    /// Check if this error is due to the API key, account or caller IP
    pub fn is_permission_error(&self) -> bool {
        matches!(self, NameSiloError::MissingApiKey)
            || matches!(
                self.reply_code(),
                Some(109..=113) | Some(116) | Some(120)
            )
    }

    /// Check if the account lacks funds for the requested transaction
    pub fn is_insufficient_funds(&self) -> bool {
        self.reply_code() == Some(119)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = NameSiloError::api(261, "Domain processing error", "registry said no");
        let text = error.to_string();
        assert!(text.contains("261"));
        assert!(text.contains("registry said no"));

        let error = NameSiloError::api(110, "Invalid API key", "");
        assert_eq!(error.to_string(), "NameSilo API error 110: Invalid API key");

        let error = NameSiloError::missing_field("balance");
        assert!(error.to_string().contains("balance"));
    }

    #[test]
    fn test_error_properties() {
        assert!(NameSiloError::api(400, "", "").is_retryable());
        assert!(NameSiloError::HttpStatus { status: 503 }.is_retryable());
        assert!(!NameSiloError::HttpStatus { status: 404 }.is_retryable());
        assert!(NameSiloError::api(110, "Invalid API key", "").is_permission_error());
        assert!(NameSiloError::MissingApiKey.is_permission_error());
        assert!(NameSiloError::api(119, "", "").is_insufficient_funds());
        assert!(!NameSiloError::invalid_input("x").is_retryable());
        assert_eq!(NameSiloError::api(261, "", "").reply_code(), Some(261));
        assert_eq!(NameSiloError::MissingApiKey.reply_code(), None);
    }
}
