//! NameSilo reply codes.
//!
//! Every XML reply carries a numeric `code` and a free-form `detail` next to
//! the HTTP status. Codes in the 300 range are successes; everything else is
//! an error for the requested operation.

use crate::error::{NameSiloError, Result};
use serde::Serialize;

/// How a reply code should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// The operation completed
    Success,
    /// The operation completed, but NameSilo substituted something (see detail)
    SuccessWithWarning,
    /// The operation was not performed
    Error,
}

/// One entry of the reply code table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplyCode {
    pub code: u16,
    pub message: &'static str,
    pub severity: Severity,
}

impl ReplyCode {
    const fn error(code: u16, message: &'static str) -> Self {
        Self {
            code,
            message,
            severity: Severity::Error,
        }
    }

    /// Whether the operation went through
    pub fn is_success(&self) -> bool {
        !matches!(self.severity, Severity::Error)
    }
}

/// Message used for codes missing from the table
pub const UNKNOWN_CODE_MESSAGE: &str = "Unknown reply code";

static REPLY_CODES: &[ReplyCode] = &[
    ReplyCode::error(101, "HTTPS not used"),
    ReplyCode::error(102, "No version specified"),
    ReplyCode::error(103, "Invalid API version"),
    ReplyCode::error(104, "No type specified"),
    ReplyCode::error(105, "Invalid API type"),
    ReplyCode::error(106, "No operation specified"),
    ReplyCode::error(107, "Invalid API operation"),
    ReplyCode::error(108, "Missing parameters for the specified operation"),
    ReplyCode::error(109, "No API key specified"),
    ReplyCode::error(110, "Invalid API key"),
    ReplyCode::error(111, "Invalid User"),
    ReplyCode::error(112, "API not available to Sub-Accounts"),
    ReplyCode::error(113, "This API account cannot be accessed from your IP"),
    ReplyCode::error(114, "Invalid Domain Syntax"),
    ReplyCode::error(115, "Central Registry Not Responding - try again later"),
    ReplyCode::error(116, "Invalid sandbox account"),
    ReplyCode::error(
        117,
        "The provided credit card profile either does not exist, or is not associated with your account",
    ),
    ReplyCode::error(118, "The provided credit card profile has not been verified"),
    ReplyCode::error(119, "Insufficient account funds for requested transaction"),
    ReplyCode::error(120, "API key must be passed as a GET"),
    ReplyCode::error(200, "Domain is not active, or does not belong to this user"),
    ReplyCode::error(201, "Internal system error"),
    ReplyCode::error(210, "General error (details provided in response)"),
    ReplyCode::error(250, "Domain is already set to AutoRenew - No update made."),
    ReplyCode::error(251, "Domain is already set not to AutoRenew - No update made."),
    ReplyCode::error(252, "Domain is already Locked - No update made."),
    ReplyCode::error(253, "Domain is already Unlocked - No update made."),
    ReplyCode::error(254, "NameServer update cannot be made. (details provided in response)"),
    ReplyCode::error(255, "Domain is already Private - No update made."),
    ReplyCode::error(256, "Domain is already Not Private - No update made."),
    ReplyCode::error(261, "Domain processing error (details provided in response)"),
    ReplyCode::error(
        262,
        "This domain is already active within our system and therefore cannot be processed.",
    ),
    ReplyCode::error(263, "Invalid number of years, or no years provided."),
    ReplyCode::error(264, "Domain cannot be renewed for specified number of years"),
    ReplyCode::error(265, "Domain cannot be transferred at this time"),
    ReplyCode::error(266, "No domain transfer exists for this user for this domain"),
    ReplyCode::error(267, "Invalid domain name, or this is not a domain that we support"),
    ReplyCode::error(280, "DNS modification error"),
    ReplyCode {
        code: 300,
        message: "Successful API operation",
        severity: Severity::Success,
    },
    ReplyCode {
        code: 301,
        message: "Successful registration, but not all provided hosts were valid resulting in our nameservers being used",
        severity: Severity::SuccessWithWarning,
    },
    ReplyCode {
        code: 302,
        message: "Successful order, but there was an error with the contact information provided so your account default contact profile was used",
        severity: Severity::SuccessWithWarning,
    },
    ReplyCode::error(
        400,
        "Existing API request is still processing - request will need to be re-submitted",
    ),
];

/// Look up a reply code in the table
pub fn lookup(code: u16) -> Option<&'static ReplyCode> {
    REPLY_CODES.iter().find(|entry| entry.code == code)
}

/// Map a `(code, detail)` pair to its message, failing for non-success codes
pub fn check_reply_code(code: u16, detail: &str) -> Result<&'static str> {
    match lookup(code) {
        Some(entry) if entry.is_success() => Ok(entry.message),
        Some(entry) => Err(NameSiloError::api(code, entry.message, detail)),
        None => Err(NameSiloError::api(code, UNKNOWN_CODE_MESSAGE, detail)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_codes_return_message() {
        assert_eq!(check_reply_code(300, "").unwrap(), "Successful API operation");
        assert!(check_reply_code(301, "").unwrap().starts_with("Successful registration"));
        assert!(check_reply_code(302, "").is_ok());
    }

    #[test]
    fn test_error_codes_fail_with_detail() {
        match check_reply_code(400, "busy") {
            Err(NameSiloError::Api {
                code,
                message,
                detail,
            }) => {
                assert_eq!(code, 400);
                assert!(message.contains("still processing"));
                assert_eq!(detail, "busy");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }

        assert!(check_reply_code(261, "").is_err());
    }

    #[test]
    fn test_unknown_code() {
        assert!(lookup(999).is_none());
        match check_reply_code(999, "") {
            Err(NameSiloError::Api { message, .. }) => assert_eq!(message, UNKNOWN_CODE_MESSAGE),
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_table_is_sorted_and_unique() {
        assert!(REPLY_CODES.windows(2).all(|pair| pair[0].code < pair[1].code));
    }

    #[test]
    fn test_severity() {
        assert_eq!(lookup(300).map(|c| c.severity), Some(Severity::Success));
        assert_eq!(lookup(302).map(|c| c.severity), Some(Severity::SuccessWithWarning));
        assert_eq!(lookup(252).map(|c| c.severity), Some(Severity::Error));
    }
}
