use clap::{Parser, Subcommand};
use ime_catalog::{Client, Settings};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ime", version, about = "Query the IME course catalog")]
struct Cli {
    /// Settings file (defaults to ./ime.{toml,json,yaml} if present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a course
    Course { code: String },
    /// Show a course's weekly schedule
    Schedule { code: String },
    /// List every course code (slow)
    Codes,
}

fn print<T: Serialize>(value: &T, pretty: bool) -> Result<(), Box<dyn Error>> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    let client = Client::new(&settings)?;

    match cli.command {
        Command::Course { code } => print(&client.find_course(&code).await?, cli.pretty),
        Command::Schedule { code } => print(&client.find_schedule(&code).await?, cli.pretty),
        Command::Codes => print(&client.find_all_course_codes().await?, cli.pretty),
    }
}
