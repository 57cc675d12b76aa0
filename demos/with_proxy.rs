//! Example: Connect through a SOCKS5 proxy.
//!
//! All requests, including rate-limit retries, go through the proxy.
//! Hostnames are resolved on the proxy side.
//!
//! # Usage
//!
//! ```bash
//! export DISCORD_TOKEN="your-user-token"
//! export PROXY_HOST="proxy.example.com"
//! export PROXY_PORT="1080"
//! # Optional: for authenticated proxies
//! export PROXY_USER="username"
//! export PROXY_PASS="password"
//!
//! cargo run --example with_proxy
//! ```

use discord_purge::{ClientConfig, Session, Socks5Proxy, TimeoutConfig};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> discord_purge::Result<()> {
    let token = env::var("DISCORD_TOKEN").expect("DISCORD_TOKEN environment variable required");

    // Proxy configuration
    let proxy_host = env::var("PROXY_HOST").expect("PROXY_HOST environment variable required");
    let proxy_port: u16 = env::var("PROXY_PORT")
        .expect("PROXY_PORT environment variable required")
        .parse()
        .expect("PROXY_PORT must be a valid port number");

    let proxy = match (env::var("PROXY_USER").ok(), env::var("PROXY_PASS").ok()) {
        (Some(user), Some(pass)) => {
            println!("Using authenticated SOCKS5 proxy at {proxy_host}:{proxy_port}");
            Socks5Proxy::with_auth(&proxy_host, proxy_port, user, pass)
        }
        _ => {
            println!("Using SOCKS5 proxy at {proxy_host}:{proxy_port}");
            Socks5Proxy::new(&proxy_host, proxy_port)
        }
    };

    let config = ClientConfig::builder()
        .token(token)
        .proxy(proxy)
        // Proxies add latency
        .timeouts(TimeoutConfig {
            connect: Duration::from_secs(30),
            request: Duration::from_secs(60),
        })
        .build()?;

    let session = Session::connect(config).await?;
    let identity = session.identity();
    println!(
        "Connected via proxy as {} ({})",
        identity.display_name, identity.account_id
    );

    Ok(())
}
