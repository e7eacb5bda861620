use clap::{Parser, Subcommand};
use reqwest::header::HeaderMap;
use serde_json::Value;

use cep_temp::cep;
use cep_temp::observability::{trace, TraceContext};
use cep_temp::pipeline::CepRequest;

#[derive(Parser)]
#[command(name = "cep-cli")]
#[command(about = "Client for the cep-temp edge service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the current temperature for a postal code
    Lookup {
        cep: String,
        /// Start a sampled trace and print its id
        #[arg(long)]
        trace: bool,
    },
    /// Check a postal code's format locally, without any request
    Validate { cep: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup { cep, trace: traced } => {
            let mut headers = HeaderMap::new();
            if traced {
                let context = TraceContext::new_root(true);
                trace::inject(&context, &mut headers);
                eprintln!("trace id: {}", context.trace_id);
            }

            let res = reqwest::Client::new()
                .post(&cli.url)
                .headers(headers)
                .json(&CepRequest { cep })
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Validate { cep: code } => {
            if cep::validate(&code) {
                println!("{code}: valid");
            } else {
                println!("{code}: invalid zipcode");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Some(id) = res.headers().get("x-request-id").and_then(|v| v.to_str().ok()) {
        eprintln!("request id: {id}");
    }

    let text = res.text().await?;
    let body = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if !status.is_success() {
        eprintln!("Error: edge returned status {}", status);
        eprintln!("{body}");
        std::process::exit(1);
    }
    println!("{body}");
    Ok(())
}

