//! Type definitions for NameSilo API replies.

use crate::error::{NameSiloError, Result};
use crate::xml::XmlValue;
use crate::{PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which NameSilo endpoint the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Live registrar, real money
    #[default]
    Production,
    /// NameSilo's sandbox account
    Sandbox,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Sandbox => write!(f, "sandbox"),
        }
    }
}

impl Environment {
    /// Select the environment from a sandbox flag
    pub fn from_sandbox(sandbox: bool) -> Self {
        if sandbox {
            Environment::Sandbox
        } else {
            Environment::Production
        }
    }

    /// API endpoint for this environment
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_BASE_URL,
            Environment::Sandbox => SANDBOX_BASE_URL,
        }
    }

    /// Whether this is the sandbox endpoint
    pub fn is_sandbox(&self) -> bool {
        matches!(self, Environment::Sandbox)
    }
}

/// Outcome of a successful reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyStatus {
    /// NameSilo reply code (300, 301 or 302)
    pub code: u16,
    /// Description from the reply code table
    pub message: String,
    /// Free-form `detail` sent by NameSilo
    pub detail: String,
}

impl ReplyStatus {
    /// True for 301/302 replies, where NameSilo completed the order with substitutions
    pub fn has_warning(&self) -> bool {
        self.code != 300
    }
}

/// A checked reply together with its raw `reply` mapping
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: ReplyStatus,
    /// Everything under `<namesilo><reply>`
    pub body: XmlValue,
}

impl Reply {
    /// Raw reply entry
    pub fn get(&self, key: &str) -> Option<&XmlValue> {
        self.body.get(key)
    }

    /// Non-empty text of a reply field
    pub fn text(&self, key: &str) -> Option<&str> {
        self.body.text_of(key)
    }

    /// Text of a reply field the caller cannot do without
    pub fn require_text(&self, key: &str) -> Result<&str> {
        self.text(key)
            .ok_or_else(|| NameSiloError::missing_field(key))
    }

    /// Monetary reply field
    pub fn amount(&self, key: &str) -> Result<f64> {
        parse_amount(key, self.require_text(key)?)
    }
}

/// Registration, expiry and configuration of a domain in the account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainInfo {
    pub created: NaiveDate,
    pub expires: NaiveDate,
    /// Registry status, e.g. "Active"
    pub status: String,
    pub locked: bool,
    pub private: bool,
    pub auto_renew: bool,
    pub traffic_type: Option<String>,
    pub email_verification_required: bool,
    pub portfolio: Option<String>,
    pub forward_url: Option<String>,
    pub forward_type: Option<String>,
    /// Nameservers in position order
    pub nameservers: Vec<String>,
    pub contact_ids: ContactIds,
}

impl DomainInfo {
    /// Build from the `reply` mapping of a `getDomainInfo` call
    pub fn from_reply(reply: &XmlValue) -> Result<Self> {
        let required = |key: &str| {
            reply
                .text_of(key)
                .ok_or_else(|| NameSiloError::missing_field(key))
        };
        let optional = |key: &str| reply.text_of(key).map(str::to_string);
        let date = |key: &str| -> Result<NaiveDate> {
            let text = required(key)?;
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map_err(|_| NameSiloError::invalid_value(key, text))
        };
        let flag = |key: &str| -> Result<bool> { parse_yes_no(key, required(key)?) };

        let mut nameservers: Vec<(u32, String)> = reply
            .path(&["nameservers", "nameserver"])
            .map(|list| {
                list.items()
                    .enumerate()
                    .filter_map(|(index, entry)| {
                        let host = entry.as_text()?;
                        let position = entry
                            .attribute("position")
                            .and_then(|p| p.parse().ok())
                            .unwrap_or(index as u32 + 1);
                        Some((position, host.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        nameservers.sort_by_key(|(position, _)| *position);

        let contact_ids = reply
            .get("contact_ids")
            .map(ContactIds::from_xml)
            .unwrap_or_default();

        Ok(Self {
            created: date("created")?,
            expires: date("expires")?,
            status: required("status")?.to_string(),
            locked: flag("locked")?,
            private: flag("private")?,
            auto_renew: flag("auto_renew")?,
            traffic_type: optional("traffic_type"),
            email_verification_required: match reply.text_of("email_verification_required") {
                Some(text) => parse_yes_no("email_verification_required", text)?,
                None => false,
            },
            portfolio: optional("portfolio"),
            forward_url: optional("forward_url"),
            forward_type: optional("forward_type"),
            nameservers: nameservers.into_iter().map(|(_, host)| host).collect(),
            contact_ids,
        })
    }

    /// Days from `today` until expiry, negative once expired
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expires - today).num_days()
    }
}

/// Contact profiles attached to a domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactIds {
    pub registrant: Option<String>,
    pub administrative: Option<String>,
    pub technical: Option<String>,
    pub billing: Option<String>,
}

impl ContactIds {
    fn from_xml(node: &XmlValue) -> Self {
        let id = |key: &str| node.text_of(key).map(str::to_string);
        Self {
            registrant: id("registrant"),
            administrative: id("administrative"),
            technical: id("technical"),
            billing: id("billing"),
        }
    }
}

/// A registrant contact profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Assigned by NameSilo; `None` for contacts not created yet
    pub contact_id: Option<String>,
    pub nickname: Option<String>,
    pub company: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Two-letter country code
    pub country: String,
    pub email: String,
    pub phone: String,
    pub fax: Option<String>,
}

impl Contact {
    /// Build from one `<contact>` element
    pub fn from_xml(node: &XmlValue) -> Self {
        let text = |key: &str| node.text_of(key).unwrap_or_default().to_string();
        let optional = |key: &str| node.text_of(key).map(str::to_string);
        Self {
            contact_id: optional("contact_id"),
            nickname: optional("nickname"),
            company: optional("company"),
            first_name: text("first_name"),
            last_name: text("last_name"),
            address: text("address"),
            address2: optional("address2"),
            city: text("city"),
            state: text("state"),
            zip: text("zip"),
            country: text("country"),
            email: text("email"),
            phone: text("phone"),
            fax: optional("fax"),
        }
    }

    /// Fail if a field NameSilo requires for contact creation is blank
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("country", &self.country),
            ("email", &self.email),
            ("phone", &self.phone),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(NameSiloError::invalid_input(format!(
                "Contact field {} cannot be empty",
                name
            ))),
            None => Ok(()),
        }
    }

    /// Query parameters used by `contactAdd` and `contactUpdate`
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("fn", self.first_name.clone()),
            ("ln", self.last_name.clone()),
            ("ad", self.address.clone()),
        ];
        push_optional(&mut params, "ad2", &self.address2);
        params.extend([
            ("cy", self.city.clone()),
            ("st", self.state.clone()),
            ("zp", self.zip.clone()),
            ("ct", self.country.clone()),
            ("em", self.email.clone()),
            ("ph", self.phone.clone()),
        ]);
        push_optional(&mut params, "nn", &self.nickname);
        push_optional(&mut params, "cp", &self.company);
        push_optional(&mut params, "fx", &self.fax);
        params
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

fn push_optional(params: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
        params.push((key, value.to_string()));
    }
}

/// Result of a `checkRegisterAvailability` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub available: Vec<AvailableDomain>,
    pub unavailable: Vec<String>,
    pub invalid: Vec<String>,
}

/// A domain that can be registered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableDomain {
    pub domain: String,
    /// Registration price in USD
    pub price: Option<f64>,
    pub premium: bool,
    /// Registration period in years the price applies to
    pub duration: Option<u32>,
}

impl AvailabilityReport {
    /// Build from the `reply` mapping of a `checkRegisterAvailability` call
    pub fn from_reply(reply: &XmlValue) -> Self {
        let available = section_entries(reply.get("available"))
            .filter_map(|entry| {
                Some(AvailableDomain {
                    domain: entry.as_text()?.to_string(),
                    price: entry
                        .attribute("price")
                        .and_then(|p| parse_amount("price", p).ok()),
                    premium: entry.attribute("premium") == Some("1"),
                    duration: entry.attribute("duration").and_then(|d| d.parse().ok()),
                })
            })
            .collect();

        let names = |key: &str| {
            section_entries(reply.get(key))
                .filter_map(XmlValue::as_text)
                .map(str::to_string)
                .collect()
        };

        Self {
            available,
            unavailable: names("unavailable"),
            invalid: names("invalid"),
        }
    }

    /// Whether `domain` was reported as available
    pub fn is_available(&self, domain: &str) -> bool {
        self.available
            .iter()
            .any(|entry| entry.domain.eq_ignore_ascii_case(domain))
    }
}

/// `<domain>` entries of an availability section, or the section itself when
/// it holds a bare name
fn section_entries(section: Option<&XmlValue>) -> impl Iterator<Item = &XmlValue> {
    section
        .into_iter()
        .flat_map(|section| match section.get("domain") {
            Some(domains) => domains.items(),
            None => section.items(),
        })
}

/// Prices for one TLD, in USD
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TldPrice {
    pub registration: Option<f64>,
    pub transfer: Option<f64>,
    pub renew: Option<f64>,
}

impl TldPrice {
    /// Build from one TLD element of a `getPrices` reply
    pub fn from_xml(tld: &str, node: &XmlValue) -> Result<Self> {
        let price = |key: &str| -> Result<Option<f64>> {
            node.text_of(key)
                .map(|text| parse_amount(&format!("{}.{}", tld, key), text))
                .transpose()
        };
        Ok(Self {
            registration: price("registration")?,
            transfer: price("transfer")?,
            renew: price("renew")?,
        })
    }
}

/// Options for `registerDomain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOptions {
    /// Registration period, 1 to 10 years
    pub years: u8,
    /// Enable WHOIS privacy
    pub private: bool,
    pub auto_renew: bool,
    /// Contact profile to use instead of the account default
    pub contact_id: Option<String>,
    /// Custom nameservers; empty keeps NameSilo's defaults
    pub nameservers: Vec<String>,
}

impl Default for RegistrationOptions {
    fn default() -> Self {
        Self {
            years: 1,
            private: false,
            auto_renew: false,
            contact_id: None,
            nameservers: Vec::new(),
        }
    }
}

/// Parse a money value such as `1,234.50`
pub(crate) fn parse_amount(field: &str, text: &str) -> Result<f64> {
    text.trim()
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| NameSiloError::invalid_value(field, text))
}

/// Parse NameSilo's `Yes`/`No` flags
pub(crate) fn parse_yes_no(field: &str, text: &str) -> Result<bool> {
    match text.trim() {
        t if t.eq_ignore_ascii_case("yes") || t == "1" => Ok(true),
        t if t.eq_ignore_ascii_case("no") || t == "0" => Ok(false),
        _ => Err(NameSiloError::invalid_value(field, text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(xml: &str) -> XmlValue {
        XmlValue::parse(xml).unwrap().into_child("reply").unwrap()
    }

    #[test]
    fn test_environment() {
        assert_eq!(Environment::from_sandbox(true), Environment::Sandbox);
        assert_eq!(Environment::Sandbox.to_string(), "sandbox");
        assert!(Environment::Sandbox.base_url().contains("sandbox"));
        assert!(!Environment::Production.is_sandbox());
    }

    #[test]
    fn test_domain_info_from_reply() {
        let first = reply(
            r#"<reply>
                 <code>300</code><detail>success</detail>
                 <created>2012-03-30</created>
                 <expires>2019-03-30</expires>
                 <status>Active</status>
                 <locked>Yes</locked>
                 <private>No</private>
                 <auto_renew>No</auto_renew>
                 <traffic_type>Forwarded</traffic_type>
                 <email_verification_required>No</email_verification_required>
                 <portfolio/>
                 <forward_url>http://www.example.org</forward_url>
                 <forward_type>Temporary Forward (302)</forward_type>
                 <nameservers>
                   <nameserver position="2">NS2.EXAMPLE.COM</nameserver>
                   <nameserver position="1">NS1.EXAMPLE.COM</nameserver>
                 </nameservers>
                 <contact_ids>
                   <registrant>475</registrant>
                   <administrative>475</administrative>
                   <technical>475</technical>
                   <billing>476</billing>
                 </contact_ids>
               </reply>"#,
        );

        let info = DomainInfo::from_reply(&first).unwrap();
        assert_eq!(info.created, NaiveDate::from_ymd_opt(2012, 3, 30).unwrap());
        assert_eq!(info.status, "Active");
        assert!(info.locked);
        assert!(!info.private);
        assert_eq!(info.portfolio, None);
        assert_eq!(info.nameservers, vec!["NS1.EXAMPLE.COM", "NS2.EXAMPLE.COM"]);
        assert_eq!(info.contact_ids.billing.as_deref(), Some("476"));

        let unordered = reply(
            r#"<reply>
                 <created>2012-03-30</created><expires>2019-03-30</expires>
                 <status>Active</status><locked>No</locked><private>No</private><auto_renew>No</auto_renew>
                 <nameservers>
                   <nameserver>NS1.EXAMPLE.COM</nameserver>
                   <nameserver>NS2.EXAMPLE.COM</nameserver>
                   <nameserver>NS3.EXAMPLE.COM</nameserver>
                 </nameservers>
               </reply>"#,
        );
        let info = DomainInfo::from_reply(&unordered).unwrap();
        assert_eq!(
            info.nameservers,
            vec!["NS1.EXAMPLE.COM", "NS2.EXAMPLE.COM", "NS3.EXAMPLE.COM"]
        );

        // entries without a position keep their document slot
        let mixed = reply(
            r#"<reply>
                 <created>2012-03-30</created><expires>2019-03-30</expires>
                 <status>Active</status><locked>No</locked><private>No</private><auto_renew>No</auto_renew>
                 <nameservers>
                   <nameserver position="3">NS3.EXAMPLE.COM</nameserver>
                   <nameserver>NS2.EXAMPLE.COM</nameserver>
                   <nameserver position="1">NS1.EXAMPLE.COM</nameserver>
                 </nameservers>
               </reply>"#,
        );
        let info = DomainInfo::from_reply(&mixed).unwrap();
        assert_eq!(
            info.nameservers,
            vec!["NS1.EXAMPLE.COM", "NS2.EXAMPLE.COM", "NS3.EXAMPLE.COM"]
        );
        assert_eq!(
            info.days_until_expiry(NaiveDate::from_ymd_opt(2019, 3, 20).unwrap()),
            10
        );
    }

    #[test]
    fn test_domain_info_missing_and_bad_fields() {
        let missing = reply("<reply><code>300</code><expires>2019-03-30</expires></reply>");
        assert!(matches!(
            DomainInfo::from_reply(&missing),
            Err(NameSiloError::MissingField { field }) if field == "created"
        ));

        let bad_date = reply(
            "<reply><created>30/03/2012</created><expires>2019-03-30</expires></reply>",
        );
        assert!(matches!(
            DomainInfo::from_reply(&bad_date),
            Err(NameSiloError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_contact_query_params_order() {
        let contact = Contact {
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
            address: "Fake Address 18".to_string(),
            city: "Zrenjanin".to_string(),
            state: "Vojvodina".to_string(),
            zip: "23000".to_string(),
            country: "RS".to_string(),
            email: "some.email@some.domain.com".to_string(),
            phone: "003816050005000".to_string(),
            company: Some("Acme".to_string()),
            address2: Some(String::new()),
            ..Default::default()
        };

        let keys: Vec<_> = contact.to_query_params().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["fn", "ln", "ad", "cy", "st", "zp", "ct", "em", "ph", "cp"]
        );
        assert!(contact.validate().is_ok());
        assert_eq!(contact.full_name(), "First Last");
    }

    #[test]
    fn test_contact_validation() {
        let contact = Contact {
            first_name: "First".to_string(),
            ..Default::default()
        };
        match contact.validate() {
            Err(NameSiloError::InvalidInput { message }) => assert!(message.contains("last_name")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_availability_report() {
        let reply = reply(
            r#"<reply>
                 <code>300</code>
                 <available>
                   <domain price="8.99" premium="0" duration="1">free.com</domain>
                   <domain price="1,200.00" premium="1" duration="1">shiny.com</domain>
                 </available>
                 <unavailable><domain>taken.com</domain></unavailable>
                 <invalid><domain>bad..com</domain></invalid>
               </reply>"#,
        );

        let report = AvailabilityReport::from_reply(&reply);
        assert_eq!(report.available.len(), 2);
        assert_eq!(report.available[1].price, Some(1200.0));
        assert!(report.available[1].premium);
        assert!(report.is_available("FREE.com"));
        assert!(!report.is_available("taken.com"));
        assert_eq!(report.unavailable, vec!["taken.com"]);
        assert_eq!(report.invalid, vec!["bad..com"]);
    }

    #[test]
    fn test_availability_report_without_sections() {
        let reply = reply("<reply><code>300</code></reply>");
        let report = AvailabilityReport::from_reply(&reply);
        assert_eq!(report, AvailabilityReport::default());
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_amount("balance", " 1,234.50 ").unwrap(), 1234.5);
        assert!(parse_amount("balance", "n/a").is_err());
        assert!(parse_yes_no("locked", "YES").unwrap());
        assert!(!parse_yes_no("locked", "No").unwrap());
        assert!(parse_yes_no("locked", "maybe").is_err());
    }
}
