//! Account overview example for the NameSilo library.
//!
//! This example demonstrates:
//! - Reading the account balance
//! - Listing domains and contact profiles
//! - Printing the price list for selected TLDs
//!
//! Usage:
//! ```
//! NAMESILO_API_KEY=your_key cargo run --example account_overview -- com net org
//! ```

use namesilo_xml::NameSiloClient;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let tlds: Vec<String> = env::args()
        .skip(1)
        .map(|tld| tld.trim_start_matches('.').to_lowercase())
        .collect();

    let client = NameSiloClient::from_env()?;

    let balance = client.get_account_balance().await?;
    println!("=== Account ===");
    println!("Balance: ${:.2}", balance);

    let domains = client.list_domains().await?;
    println!("\n=== Domains ({}) ===", domains.len());
    for domain in &domains {
        println!("  {}", domain);
    }

    let contacts = client.list_contacts().await?;
    println!("\n=== Contacts ({}) ===", contacts.len());
    for contact in &contacts {
        println!(
            "  #{:<8} {:<25} {}",
            contact.contact_id.as_deref().unwrap_or("-"),
            contact.full_name(),
            contact.email
        );
    }

    let prices = client.get_prices().await?;
    println!("\n=== Prices ===");
    println!("{:<10} {:>12} {:>12} {:>12}", "TLD", "Register", "Transfer", "Renew");
    let format_price = |price: Option<f64>| {
        price
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "-".to_string())
    };
    for (tld, price) in prices
        .iter()
        .filter(|(tld, _)| tlds.is_empty() || tlds.contains(tld))
    {
        println!(
            "{:<10} {:>12} {:>12} {:>12}",
            tld,
            format_price(price.registration),
            format_price(price.transfer),
            format_price(price.renew)
        );
    }

    Ok(())
}
