use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use schedule_extract::pipeline::{ExtractRequest, extract};
use schedule_extract::vessels::{ResolverConfig, VesselResolver};
use tracing_subscriber::EnvFilter;

/// Extract shipping schedules from an OCR text dump and print them as JSON.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// OCR text file, one line per OCR line.
    input: PathBuf,

    /// Carrier hint, e.g. MAERSK or CMA-CGM. Overrides detection.
    #[arg(long)]
    carrier: Option<String>,

    /// Skip the remote vessel stores and use the cache file or built-in table.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match ResolverConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    let bytes = match std::fs::read(&args.input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to read {}: {e}", args.input.display());
            return ExitCode::FAILURE;
        }
    };

    let resolver = if args.offline {
        VesselResolver::offline(config)
    } else {
        VesselResolver::connect(config).await
    };
    tracing::info!(mode = %resolver.mode(), "Vessel resolver ready");

    let mut request =
        ExtractRequest::from_bytes(&bytes).with_filename(args.input.to_string_lossy());
    if let Some(carrier) = args.carrier {
        request = request.with_hint(carrier);
    }

    let result = extract(&request, &resolver);

    // Learned aliases are queued; let them reach the store before exiting.
    resolver.flush().await;

    match serde_json::to_string_pretty(&result) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize result: {e}");
            ExitCode::FAILURE
        }
    }
}
