use std::sync::Arc;
use std::time::Duration;

use chat_core::{format_conversation, Message, Outcome, ProviderError, RandomPicker};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use providers::{
    build_provider, load_configs, Eligibility, ProviderConfig, ReqwestTransport, TransportSettings,
};

#[derive(Debug, Parser)]
#[command(name = "check-keys")]
#[command(about = "Send a one-line test conversation to every configured provider")]
struct Args {
    /// Only check these provider ids.
    #[arg(long)]
    provider: Vec<String>,
    /// Per-provider timeout override in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    /// Pause between providers, to stay clear of rate limits.
    #[arg(long, default_value_t = 1000)]
    pause_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("providers=info".parse()?))
        .init();
    let args = Args::parse();

    let configs: Vec<ProviderConfig> = load_configs(|key| std::env::var(key).ok())?
        .into_iter()
        .filter(|config| args.provider.is_empty() || args.provider.contains(&config.id))
        .collect();

    let transport = Arc::new(ReqwestTransport::new(&TransportSettings::default())?);
    let conversation = format_conversation(&[Message::user("Test")]);
    let mut working = 0;

    println!("{:<14} {:<26} {:>10}", "PROVIDER", "STATUS", "LATENCY");
    for config in &configs {
        let (status, latency) = match config.eligibility() {
            Eligibility::CredentialMissing => ("skipped (no key)".to_string(), None),
            Eligibility::PlaceholderCredential => ("skipped (placeholder)".to_string(), None),
            Eligibility::Eligible => {
                let config = ProviderConfig {
                    timeout: Duration::from_secs(args.timeout_secs),
                    ..config.clone()
                };
                let provider = build_provider(config, transport.clone(), Arc::new(RandomPicker));
                let result = provider.execute(&conversation).await;
                tokio::time::sleep(Duration::from_millis(args.pause_ms)).await;

                let status = match &result.outcome {
                    Outcome::Success(_) => {
                        working += 1;
                        "working".to_string()
                    }
                    Outcome::Failure(err) => describe_failure(err),
                };
                (status, Some(result.latency))
            }
        };

        let latency = latency
            .map(|latency| format!("{}ms", latency.as_millis()))
            .unwrap_or_else(|| "-".to_string());
        println!("{:<14} {:<26} {:>10}", config.id, status, latency);
    }

    info!(working, checked = configs.len(), "Key check finished");
    Ok(())
}

fn describe_failure(err: &ProviderError) -> String {
    match err {
        ProviderError::Http { status: 401, .. } => "invalid key (401)".to_string(),
        ProviderError::Http { status: 402, .. } => "payment required (402)".to_string(),
        ProviderError::Http { status: 429, .. } => "rate limited (429)".to_string(),
        ProviderError::Http { status, .. } => format!("error ({status})"),
        ProviderError::Timeout => "unreachable or timed out".to_string(),
        other => other.kind().to_string(),
    }
}
