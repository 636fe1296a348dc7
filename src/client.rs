//! NameSilo API client implementation.

use crate::error::{NameSiloError, Result};
use crate::reply_code::check_reply_code;
use crate::types::{
    AvailabilityReport, Contact, DomainInfo, Environment, RegistrationOptions, Reply, ReplyStatus,
    TldPrice,
};
use crate::xml::XmlValue;
use crate::{API_VERSION, DEFAULT_USER_AGENT, RESPONSE_FORMAT};
use reqwest::{Client, StatusCode};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};
use url::Url;

/// Environment variable holding the API key for [`NameSiloClient::from_env`]
pub const API_KEY_ENV: &str = "NAMESILO_API_KEY";
/// Environment variable switching [`NameSiloClient::from_env`] to the sandbox
pub const SANDBOX_ENV: &str = "NAMESILO_SANDBOX";
/// Environment variable overriding the endpoint for [`NameSiloClient::from_env`]
pub const BASE_URL_ENV: &str = "NAMESILO_BASE_URL";

/// NameSilo accepts between 2 and 13 nameservers per domain
const MIN_NAMESERVERS: usize = 2;
const MAX_NAMESERVERS: usize = 13;
const MAX_YEARS: u8 = 10;

const NO_PARAMS: &[(&str, &str)] = &[];

/// Configuration for the NameSilo client
#[derive(Debug, Clone)]
pub struct NameSiloClientConfig {
    /// Endpoint override; `None` uses the endpoint of the selected environment
    pub base_url: Option<String>,
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for NameSiloClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Main NameSilo API client
#[derive(Clone)]
pub struct NameSiloClient {
    /// HTTP client
    http_client: Client,
    /// NameSilo API key
    api_key: String,
    /// Production or sandbox
    environment: Environment,
    /// Client configuration
    config: NameSiloClientConfig,
}

impl fmt::Debug for NameSiloClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameSiloClient")
            .field("api_key", &"***")
            .field("environment", &self.environment)
            .field("config", &self.config)
            .finish()
    }
}

impl NameSiloClient {
    /// Create a new NameSilo client with default configuration
    pub fn new(api_key: impl Into<String>, environment: Environment) -> Result<Self> {
        Self::with_config(api_key, environment, NameSiloClientConfig::default())
    }

    /// Create a new NameSilo client with custom configuration
    pub fn with_config(
        api_key: impl Into<String>,
        environment: Environment,
        config: NameSiloClientConfig,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(NameSiloError::MissingApiKey);
        }
        if config.timeout_seconds == 0 {
            return Err(NameSiloError::invalid_input("Timeout must be at least one second"));
        }

        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            environment,
            config,
        })
    }

    /// Create a client from `NAMESILO_API_KEY`, `NAMESILO_SANDBOX` and `NAMESILO_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| NameSiloError::MissingApiKey)?;
        let sandbox = std::env::var(SANDBOX_ENV)
            .map(|value| is_truthy(&value))
            .unwrap_or(false);
        let config = NameSiloClientConfig {
            base_url: std::env::var(BASE_URL_ENV).ok().filter(|url| !url.is_empty()),
            ..NameSiloClientConfig::default()
        };

        Self::with_config(api_key, Environment::from_sandbox(sandbox), config)
    }

    /// Environment selected at construction
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Whether requests go to the sandbox endpoint
    pub fn is_sandbox(&self) -> bool {
        self.environment.is_sandbox()
    }

    /// Endpoint all operation names are appended to
    pub fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
    }

    // --- Domains ---

    /// Check whether a single domain can be registered
    pub async fn check_domain(&self, domain: &str) -> Result<bool> {
        let report = self.check_domains(&[domain]).await?;
        Ok(!report.available.is_empty())
    }

    /// Check registration availability of several domains in one request
    pub async fn check_domains(&self, domains: &[&str]) -> Result<AvailabilityReport> {
        if domains.is_empty() {
            return Err(NameSiloError::invalid_input("No domains to check"));
        }
        let domains = domains
            .iter()
            .map(|domain| validate_domain(domain))
            .collect::<Result<Vec<_>>>()?
            .join(",");

        debug!("Checking availability of: {}", domains);
        let reply = self
            .process("checkRegisterAvailability", &[("domains", domains.as_str())])
            .await?;

        Ok(AvailabilityReport::from_reply(&reply.body))
    }

    /// Register a domain
    pub async fn register_domain(
        &self,
        domain: &str,
        options: &RegistrationOptions,
    ) -> Result<ReplyStatus> {
        let domain = validate_domain(domain)?;
        validate_years(options.years)?;
        let nameservers: Vec<&str> = options.nameservers.iter().map(String::as_str).collect();
        if !nameservers.is_empty() {
            validate_nameservers(&nameservers)?;
        }

        let mut params = vec![
            ("domain".to_string(), domain.to_string()),
            ("years".to_string(), options.years.to_string()),
            ("private".to_string(), flag(options.private).to_string()),
            ("auto_renew".to_string(), flag(options.auto_renew).to_string()),
        ];
        if let Some(contact_id) = &options.contact_id {
            params.push(("contact_id".to_string(), contact_id.clone()));
        }
        params.extend(nameserver_params(&nameservers));

        let reply = self.process("registerDomain", params.as_slice()).await?;
        if reply.status.has_warning() {
            warn!("Registered {} with warning: {}", domain, reply.status.message);
        } else {
            info!("Registered {} for {} year(s)", domain, options.years);
        }
        Ok(reply.status)
    }

    /// Renew a domain for the given number of years
    pub async fn renew_domain(&self, domain: &str, years: u8) -> Result<ReplyStatus> {
        let domain = validate_domain(domain)?;
        validate_years(years)?;

        let years = years.to_string();
        let reply = self
            .process("renewDomain", &[("domain", domain), ("years", years.as_str())])
            .await?;
        info!("Renewed {} for {} year(s)", domain, years);
        Ok(reply.status)
    }

    /// Enable the registrar lock
    pub async fn lock_domain(&self, domain: &str) -> Result<ReplyStatus> {
        self.domain_operation("domainLock", domain).await
    }

    /// Disable the registrar lock
    pub async fn unlock_domain(&self, domain: &str) -> Result<ReplyStatus> {
        self.domain_operation("domainUnlock", domain).await
    }

    /// Turn on automatic renewal
    pub async fn add_auto_renewal(&self, domain: &str) -> Result<ReplyStatus> {
        self.domain_operation("addAutoRenewal", domain).await
    }

    /// Turn off automatic renewal
    pub async fn remove_auto_renewal(&self, domain: &str) -> Result<ReplyStatus> {
        self.domain_operation("removeAutoRenewal", domain).await
    }

    /// Enable WHOIS privacy
    pub async fn add_privacy(&self, domain: &str) -> Result<ReplyStatus> {
        self.domain_operation("addPrivacy", domain).await
    }

    /// Disable WHOIS privacy
    pub async fn remove_privacy(&self, domain: &str) -> Result<ReplyStatus> {
        self.domain_operation("removePrivacy", domain).await
    }

    /// Names of all domains in the account
    pub async fn list_domains(&self) -> Result<Vec<String>> {
        let reply = self.process("listDomains", NO_PARAMS).await?;
        let domains: Vec<String> = reply
            .body
            .path(&["domains", "domain"])
            .map(|list| {
                list.items()
                    .filter_map(XmlValue::as_text)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        debug!("Account holds {} domain(s)", domains.len());
        Ok(domains)
    }

    /// Registration details of a domain in the account
    pub async fn get_domain_info(&self, domain: &str) -> Result<DomainInfo> {
        let domain = validate_domain(domain)?;
        let reply = self.process("getDomainInfo", &[("domain", domain)]).await?;
        DomainInfo::from_reply(&reply.body)
    }

    /// Replace the nameservers of a domain, in order
    pub async fn change_domain_nameservers(
        &self,
        domain: &str,
        nameservers: &[&str],
    ) -> Result<ReplyStatus> {
        let domain = validate_domain(domain)?;
        validate_nameservers(nameservers)?;

        let mut params = vec![("domain".to_string(), domain.to_string())];
        params.extend(nameserver_params(nameservers));

        let reply = self.process("changeNameServers", params.as_slice()).await?;
        info!("Changed nameservers of {}", domain);
        Ok(reply.status)
    }

    // --- Contacts ---

    /// All contact profiles in the account
    pub async fn list_contacts(&self) -> Result<Vec<Contact>> {
        let reply = self.process("contactList", NO_PARAMS).await?;
        Ok(reply
            .get("contact")
            .map(|contacts| contacts.items().map(Contact::from_xml).collect())
            .unwrap_or_default())
    }

    /// Create a contact profile and return its id
    pub async fn add_contact(&self, contact: &Contact) -> Result<String> {
        contact.validate()?;

        let params = contact.to_query_params();
        let reply = self.process("contactAdd", params.as_slice()).await?;
        let contact_id = reply.require_text("contact_id")?.to_string();
        info!("Added contact {} ({})", contact_id, contact.full_name());
        Ok(contact_id)
    }

    /// Update an existing contact profile
    pub async fn update_contact(&self, contact: &Contact) -> Result<ReplyStatus> {
        let contact_id = contact
            .contact_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| NameSiloError::invalid_input("Contact id is required for updates"))?;
        contact.validate()?;

        let mut params = vec![("contact_id", contact_id.to_string())];
        params.extend(contact.to_query_params());

        let reply = self.process("contactUpdate", params.as_slice()).await?;
        info!("Updated contact {}", contact_id);
        Ok(reply.status)
    }

    /// Delete a contact profile by id
    pub async fn delete_contact(&self, contact_id: &str) -> Result<ReplyStatus> {
        let contact_id = contact_id.trim();
        if contact_id.is_empty() {
            return Err(NameSiloError::invalid_input("Contact id cannot be empty"));
        }

        let reply = self
            .process("contactDelete", &[("contact_id", contact_id)])
            .await?;
        info!("Deleted contact {}", contact_id);
        Ok(reply.status)
    }

    // --- Account ---

    /// Current account balance in USD
    pub async fn get_account_balance(&self) -> Result<f64> {
        let reply = self.process("getAccountBalance", NO_PARAMS).await?;
        reply.amount("balance")
    }

    /// Charge a verified payment profile and return the new balance
    pub async fn add_account_funds(&self, amount: f64, payment_id: &str) -> Result<f64> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(NameSiloError::invalid_input("Amount must be a positive number"));
        }
        if payment_id.trim().is_empty() {
            return Err(NameSiloError::invalid_input("Payment id cannot be empty"));
        }

        // NameSilo takes dollars and cents
        let amount = format!("{:.2}", amount);
        if amount == "0.00" {
            return Err(NameSiloError::invalid_input("Amount must be at least 0.01"));
        }
        let reply = self
            .process(
                "addAccountFunds",
                &[("amount", amount.as_str()), ("payment_id", payment_id.trim())],
            )
            .await?;
        let new_balance = reply.amount("new_balance")?;
        info!("Added {} to account, new balance {}", amount, new_balance);
        Ok(new_balance)
    }

    /// Registration, transfer and renewal prices keyed by TLD
    pub async fn get_prices(&self) -> Result<BTreeMap<String, TldPrice>> {
        let reply = self.process("getPrices", NO_PARAMS).await?;
        let entries = reply
            .body
            .as_map()
            .ok_or_else(|| NameSiloError::unexpected_response("getPrices reply has no prices"))?;

        entries
            .iter()
            .filter(|(key, node)| {
                !matches!(key.as_str(), "code" | "detail") && node.as_map().is_some()
            })
            .map(|(tld, node)| TldPrice::from_xml(tld, node).map(|price| (tld.clone(), price)))
            .collect()
    }

    // --- Pipeline ---

    /// Call any API operation and return the checked reply.
    ///
    /// Useful for operations this client has no dedicated method for.
    pub async fn call(&self, operation: &str, params: &[(&str, &str)]) -> Result<Reply> {
        if operation.is_empty() || !operation.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(NameSiloError::invalid_input(format!(
                "Invalid operation name: {:?}",
                operation
            )));
        }
        self.process(operation, params).await
    }

    /// Build the request URL for an operation.
    ///
    /// Parameters are always `version`, `type` and `key` followed by the
    /// operation's own parameters in the given order.
    pub fn build_url<K, V>(&self, operation: &str, params: &[(K, V)]) -> Result<Url>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut base = Url::parse(self.base_url())?;

        // without a trailing slash `join` would replace the last path segment
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut url = base.join(operation)?;
        url.query_pairs_mut()
            .append_pair("version", API_VERSION)
            .append_pair("type", RESPONSE_FORMAT)
            .append_pair("key", &self.api_key)
            .extend_pairs(params.iter().map(as_pair));

        Ok(url)
    }

    /// GET a URL and decode the XML body
    pub async fn fetch_xml(&self, url: &Url) -> Result<XmlValue> {
        debug!("Making request to: {}", redact_key(url));

        let response = self.http_client.get(url.clone()).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("NameSilo answered with HTTP {}", status);
            return Err(NameSiloError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let xml_content = response.text().await?;
        debug!("Received XML response: {}", xml_content);

        XmlValue::parse(&xml_content).map_err(|e| {
            warn!("Failed to parse XML response: {}", e);
            warn!("Response content: {}", xml_content);
            e
        })
    }

    async fn process<K, V>(&self, operation: &str, params: &[(K, V)]) -> Result<Reply>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let url = self.build_url(operation, params)?;
        let document = self.fetch_xml(&url).await?;
        parse_reply(document)
    }

    async fn domain_operation(&self, operation: &str, domain: &str) -> Result<ReplyStatus> {
        let domain = validate_domain(domain)?;
        let reply = self.process(operation, &[("domain", domain)]).await?;
        info!("{} succeeded for {}", operation, domain);
        Ok(reply.status)
    }
}

/// Extract and check the reply code of a decoded document
pub(crate) fn parse_reply(document: XmlValue) -> Result<Reply> {
    let body = document
        .into_child("namesilo")
        .and_then(|namesilo| namesilo.into_child("reply"))
        .ok_or_else(|| {
            NameSiloError::unexpected_response("missing <namesilo><reply> element")
        })?;

    let code_text = body
        .text_of("code")
        .ok_or_else(|| NameSiloError::unexpected_response("reply has no code"))?;
    let code = code_text.trim().parse::<u16>().map_err(|_| {
        NameSiloError::unexpected_response(format!("reply code {:?} is not a number", code_text))
    })?;
    let detail = body.text_of("detail").unwrap_or_default().to_string();

    let message = check_reply_code(code, &detail).map_err(|e| {
        warn!("NameSilo rejected the request: {}", e);
        e
    })?;

    Ok(Reply {
        status: ReplyStatus {
            code,
            message: message.to_string(),
            detail,
        },
        body,
    })
}

fn validate_domain(domain: &str) -> Result<&str> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(NameSiloError::invalid_input("Domain cannot be empty"));
    }
    if domain.contains(|c: char| c.is_whitespace() || c == ',') {
        return Err(NameSiloError::invalid_input(format!(
            "Invalid domain: {:?}",
            domain
        )));
    }
    Ok(domain)
}

fn validate_years(years: u8) -> Result<()> {
    if years == 0 || years > MAX_YEARS {
        return Err(NameSiloError::invalid_input(format!(
            "Years must be between 1 and {}, got {}",
            MAX_YEARS, years
        )));
    }
    Ok(())
}

fn validate_nameservers(nameservers: &[&str]) -> Result<()> {
    if !(MIN_NAMESERVERS..=MAX_NAMESERVERS).contains(&nameservers.len()) {
        return Err(NameSiloError::invalid_input(format!(
            "Between {} and {} nameservers are required, got {}",
            MIN_NAMESERVERS,
            MAX_NAMESERVERS,
            nameservers.len()
        )));
    }
    if nameservers.iter().any(|ns| ns.trim().is_empty()) {
        return Err(NameSiloError::invalid_input("Nameserver cannot be empty"));
    }
    Ok(())
}

/// `ns1`, `ns2`, ... parameters
fn nameserver_params(nameservers: &[&str]) -> Vec<(String, String)> {
    nameservers
        .iter()
        .enumerate()
        .map(|(index, ns)| (format!("ns{}", index + 1), ns.trim().to_string()))
        .collect()
}

fn as_pair<K: AsRef<str>, V: AsRef<str>>((key, value): &(K, V)) -> (&str, &str) {
    (key.as_ref(), value.as_ref())
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// URL with the `key` parameter masked, for logging
fn redact_key(url: &Url) -> String {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "key" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    let mut shown = url.clone();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
