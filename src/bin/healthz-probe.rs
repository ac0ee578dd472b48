//! One-shot client for exec-style probes.
//!
//! Exits 0 when the health endpoint answers 200, 1 otherwise.

use clap::Parser;
use reqwest::StatusCode;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "healthz-probe")]
#[command(about = "Query a /healthz endpoint once", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:10254/healthz")]
    url: String,

    /// Give up after this many milliseconds.
    #[arg(short, long, default_value_t = 2000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match probe(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn probe(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(cli.timeout_ms))
        .no_proxy()
        .build()?;

    let res = client.get(&cli.url).send().await?;
    let status = res.status();
    let body = res.text().await?;

    if is_healthy(status) {
        println!("{body}");
        Ok(true)
    } else {
        eprintln!("Error: {} returned status {}", cli.url, status);
        eprintln!("{body}");
        Ok(false)
    }
}

/// Only an exact 200 counts; other 2xx answers are not a healthz verdict.
fn is_healthy(status: StatusCode) -> bool {
    status == StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_200_is_healthy() {
        assert!(is_healthy(StatusCode::OK));
        assert!(!is_healthy(StatusCode::NO_CONTENT));
        assert!(!is_healthy(StatusCode::ACCEPTED));
        assert!(!is_healthy(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_healthy(StatusCode::REQUEST_TIMEOUT));
    }
}
