//! Domain availability and details example for the NameSilo library.
//!
//! This example demonstrates how to:
//! - Create a NameSilo client from environment variables
//! - Check whether domains can be registered
//! - Show details for domains already in the account
//! - Handle reply-code errors
//!
//! Usage:
//! ```
//! NAMESILO_API_KEY=your_key NAMESILO_SANDBOX=1 cargo run --example check_domain -- example.com example.org
//! ```

use namesilo_xml::{NameSiloClient, NameSiloError, Utc};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let domains: Vec<String> = env::args().skip(1).collect();
    if domains.is_empty() {
        eprintln!("Usage: check_domain <domain> [<domain> ...]");
        eprintln!("Example: check_domain example.com example.org");
        std::process::exit(1);
    }

    let client = match NameSiloClient::from_env() {
        Ok(client) => client,
        Err(NameSiloError::MissingApiKey) => {
            eprintln!("NAMESILO_API_KEY environment variable must be set");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    println!("Using the {} endpoint", client.environment());

    let names: Vec<&str> = domains.iter().map(String::as_str).collect();
    let report = match client.check_domains(&names).await {
        Ok(report) => report,
        Err(e) if e.is_permission_error() => {
            eprintln!("NameSilo refused the API key: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Availability check failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n=== Availability ===");
    for entry in &report.available {
        let price = entry
            .price
            .map(|p| format!("${:.2}", p))
            .unwrap_or_else(|| "price unknown".to_string());
        let premium = if entry.premium { " (premium)" } else { "" };
        println!("{:<30} available  {}{}", entry.domain, price, premium);
    }
    for domain in &report.unavailable {
        println!("{:<30} taken", domain);
    }
    for domain in &report.invalid {
        println!("{:<30} invalid", domain);
    }

    // Domains we own show up as unavailable; print their details
    let owned = client.list_domains().await?;
    let today = Utc::now().date_naive();
    for domain in report.unavailable.iter().filter(|d| owned.contains(d)) {
        match client.get_domain_info(domain).await {
            Ok(info) => {
                println!("\n=== {} ===", domain);
                println!("Status: {}", info.status);
                println!("Registered: {}", info.created);
                println!(
                    "Expires: {} ({} days)",
                    info.expires,
                    info.days_until_expiry(today)
                );
                println!("Locked: {}", info.locked);
                println!("Auto-renew: {}", info.auto_renew);
                println!("Privacy: {}", info.private);
                if !info.nameservers.is_empty() {
                    println!("Nameservers: {}", info.nameservers.join(", "));
                }
            }
            Err(e) => eprintln!("Could not load {}: {}", domain, e),
        }
    }

    Ok(())
}
