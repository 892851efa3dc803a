use clap::{Parser, Subcommand};
use serde_json::Value;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fanout-cli")]
#[command(about = "Client for the fan-out gateway race endpoints", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Race deadline in milliseconds (server default when omitted)
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect every response; fails on any shortfall
    All,
    /// First successful response
    First,
    /// Whatever answered before the deadline
    WithinTimeout,
    /// Probe once, widen the race if the probe is slow
    Smart,
}

impl Commands {
    fn path(&self) -> &'static str {
        match self {
            Commands::All => "/api/all",
            Commands::First => "/api/first",
            Commands::WithinTimeout => "/api/within-timeout",
            Commands::Smart => "/api/smart",
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut request = client.get(format!("{}{}", cli.url.trim_end_matches('/'), cli.command.path()));
    if let Some(timeout) = cli.timeout {
        request = request.query(&[("timeout", timeout)]);
    }

    let res = request.send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(ExitCode::FAILURE);
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(ExitCode::SUCCESS)
}
