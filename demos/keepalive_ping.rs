//! Keepalived driver connection smoke test.
//!
//! Demonstrates:
//! - Lazy connect on the first `send`
//! - Connection reuse for an immediate second `send`
//! - Failure after an idle gap longer than the daemon's keepalive window
//! - Explicit `reset` followed by a clean reconnect
//!
//! Usage:
//!   cargo run --example keepalive_ping
//!   DBSYNC_SERVER=10.0.0.5:1111 cargo run --example keepalive_ping

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use dbsync_client::{Command, Driver, Reply, Result};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    println!("=== Keepalived driver connection ===\n");

    let endpoint =
        std::env::var("DBSYNC_SERVER").unwrap_or_else(|_| "127.0.0.1:1111".to_string());

    // Threshold deliberately above the daemon's idle-close window so that
    // step 4 runs into the dead socket instead of reconnecting silently.
    let driver = Driver::builder()
        .endpoint(&endpoint)
        .staleness_threshold(Duration::from_secs(30))
        .build()?;

    println!("1. First ping call: {}", show(driver.send(&Command::new("PING")).await));
    println!(
        "2. Immediate second ping call: {}",
        show(driver.send(&Command::new("PING")).await)
    );

    println!("3. 5 seconds delay");
    tokio::time::sleep(Duration::from_secs(5)).await;

    println!(
        "4. Ping call after long delay (should fail): {}",
        show(driver.send(&Command::new("PING")).await)
    );

    driver.reset().await;

    println!(
        "5. Ping call after connection reset: {}",
        show(driver.send(&Command::new("PING")).await)
    );

    Ok(())
}

fn show(result: Result<Reply>) -> String {
    match result {
        Ok(reply) => reply.into_text(),
        Err(e) => format!("<{e}>"),
    }
}
