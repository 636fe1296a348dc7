//! # NameSilo XML API Client
//!
//! An async Rust client library for the NameSilo domain registrar API.
//!
//! Every operation follows the same path: build a request URL from the
//! endpoint, API version, output format, API key and operation parameters,
//! GET it, decode the XML reply into a nested mapping, check the vendor
//! reply code, and reshape the reply into a plain record.
//!
//! ## Features
//!
//! - **Domains**: availability checks, registration, renewal, locking,
//!   auto-renew and privacy toggles, nameserver changes, domain details
//! - **Contacts**: list, add, update and delete contact profiles
//! - **Account**: balance, adding funds, TLD price list
//! - **Sandbox**: switch to NameSilo's sandbox endpoint with one flag
//! - **Error Handling**: reply codes mapped to typed errors with the vendor's detail
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use namesilo_xml::{Environment, NameSiloClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NameSiloClient::new("your_api_key", Environment::Sandbox)?;
//!
//!     if client.check_domain("example.com").await? {
//!         println!("example.com is available");
//!     }
//!
//!     let balance = client.get_account_balance().await?;
//!     println!("Balance: ${:.2}", balance);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! Requests are authenticated with an API key generated in the NameSilo
//! account manager. Sandbox keys only work against [`Environment::Sandbox`].

pub mod client;
pub mod error;
pub mod reply_code;
pub mod types;
pub mod xml;

pub use client::{NameSiloClient, NameSiloClientConfig};
pub use error::{NameSiloError, Result};
pub use reply_code::{ReplyCode, Severity};
pub use types::{
    AvailabilityReport, AvailableDomain, Contact, ContactIds, DomainInfo, Environment,
    RegistrationOptions, Reply, ReplyStatus, TldPrice,
};
pub use xml::XmlValue;

/// Re-export commonly used types from chrono for convenience
pub use chrono::{NaiveDate, Utc};

/// Production API endpoint
pub const PRODUCTION_BASE_URL: &str = "https://www.namesilo.com/api/";

/// Sandbox API endpoint
pub const SANDBOX_BASE_URL: &str = "https://sandbox.namesilo.com/api/";

/// API version sent with every request
pub const API_VERSION: &str = "1";

/// Reply format sent with every request
pub const RESPONSE_FORMAT: &str = "xml";

/// Default user agent string for requests
pub const DEFAULT_USER_AGENT: &str = concat!("namesilo-xml-rs/", env!("CARGO_PKG_VERSION"));

#[allow(clippy::const_is_empty)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(PRODUCTION_BASE_URL.ends_with('/'));
        assert!(SANDBOX_BASE_URL.ends_with('/'));
        assert!(DEFAULT_USER_AGENT.contains("namesilo-xml-rs"));
        assert!(!API_VERSION.is_empty());
    }
}
