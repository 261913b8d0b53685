use anyhow::Context;
use clap::{Parser, Subcommand};

use bookstall_app::modules::books::isbn;
use bookstall_app::modules::pricing::price::price_for;
use bookstall_kernel::settings::Settings;

/// Bookstall command line
#[derive(Debug, Parser)]
#[command(name = "bookstall", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Print the base price for an identifier, exactly as typed
    Price { isbn: String },
    /// Validate an ISBN and print its ISBN-10 and ISBN-13 forms
    Normalize { isbn: String },
    /// Print the effective settings as JSON
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => serve(),
        Command::Price { isbn } => {
            match price_for(&isbn) {
                Some(price) => println!("{price}"),
                None => println!("no price"),
            }
            Ok(())
        }
        Command::Normalize { isbn } => {
            let pair = isbn::normalize(&isbn)
                .with_context(|| format!("'{isbn}' is not a valid ISBN"))?;
            println!("isbn10: {}", pair.isbn10);
            println!("isbn13: {}", pair.isbn13);
            Ok(())
        }
        Command::Config => {
            let settings = load_settings()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

fn serve() -> anyhow::Result<()> {
    let settings = load_settings()?;
    bookstall_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, "bookstall serve starting");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?
        .block_on(bookstall_app::run(settings))
}

fn load_settings() -> anyhow::Result<Settings> {
    Settings::load().context("failed to load bookstall settings")
}
