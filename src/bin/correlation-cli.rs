use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;

use request_correlation::correlation::KORRELASJONS_ID_HEADER;

#[derive(Parser)]
#[command(name = "correlation-cli")]
#[command(about = "Inspect correlation handling of a running server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what a handler sees in the context store and the trace
    Snapshot {
        /// Correlation id to send; omitted means the server generates one
        #[arg(long)]
        id: Option<String>,

        /// traceparent to send, continuing an existing trace
        #[arg(long)]
        traceparent: Option<String>,
    },
    /// Check the server is up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Snapshot { id, traceparent } => {
            let mut headers = HeaderMap::new();
            if let Some(id) = id {
                headers.insert(KORRELASJONS_ID_HEADER.clone(), HeaderValue::from_str(&id)?);
            }
            if let Some(traceparent) = traceparent {
                headers.insert("traceparent", HeaderValue::from_str(&traceparent)?);
            }
            let res = client
                .get(format!("{}/correlation", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            println!("{}", res.status());
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if let Some(id) = res.headers().get(&KORRELASJONS_ID_HEADER) {
        eprintln!("{}: {}", KORRELASJONS_ID_HEADER, id.to_str().unwrap_or("<binary>"));
    }
    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
