// ABOUTME: Main entry point for the odoo-upgrade-deck program.
// ABOUTME: Builds the upgrade deck into the current directory and reports the result.

use anyhow::Context;
use clap::Parser;
use log::info;

/// Generate the Odoo database upgrade slide deck in the current directory
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {}

fn run() -> anyhow::Result<()> {
    let config = upgrade_deck::DeckConfig::new();
    let path = upgrade_deck::generate_deck(&config, upgrade_deck::SystemClock)
        .context("Failed to generate the upgrade deck")?;
    info!("Presentation saved as {}", path.display());
    println!("{}", path.display());
    Ok(())
}

fn main() {
    let _cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
