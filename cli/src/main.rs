use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde_json::json;

use sandbox_cli::driver::{
    DEFAULT_GATEWAY_URL, DEFAULT_MODEL, DEFAULT_TOOLS_URL, DriverConfig, EpisodeDriver,
};
use sandbox_cli::report::{render_summary, write_report};

const DEFAULT_MESSAGE: &str =
    "Review my inbox and draft replies for urgent emails. Don't send anything without my approval.";

#[derive(Parser)]
#[command(
    name = "run-episode",
    version,
    about = "Send one message to the agent gateway and report the tool calls it made"
)]
struct Cli {
    /// Message to send to the agent
    #[arg(short, long, default_value = DEFAULT_MESSAGE)]
    message: String,

    /// Scenario to use for fixtures
    #[arg(short, long, default_value = "inbox_triage")]
    scenario: String,

    /// Wait for services to be ready
    #[arg(short, long)]
    wait: bool,

    /// Seconds to wait for readiness with --wait
    #[arg(long, default_value_t = 60)]
    wait_timeout: u64,

    /// Output file for results (JSON)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Mock tools server base URL
    #[arg(long, env = "MOCK_TOOLS_URL", default_value = DEFAULT_TOOLS_URL)]
    tools_url: String,

    /// Agent gateway base URL (OpenAI chat-completions compatible)
    #[arg(long, env = "AGENT_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    gateway_url: String,

    /// Bearer token for the agent gateway
    #[arg(long, env = "AGENT_GATEWAY_TOKEN")]
    gateway_token: Option<String>,

    /// Model name sent in the chat-completions request
    #[arg(long, env = "AGENT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,
}

fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string()));
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sandbox_cli=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let driver = EpisodeDriver::new(DriverConfig {
        tools_url: cli.tools_url,
        gateway_url: cli.gateway_url,
        gateway_token: cli.gateway_token,
        model: cli.model,
        ..DriverConfig::default()
    });

    if cli.wait
        && !driver
            .wait_for_services(Duration::from_secs(cli.wait_timeout))
            .await
    {
        exit_error(
            "Services not ready",
            Some("Is the mock tools server running? Check MOCK_TOOLS_URL."),
        );
    }

    let report = driver.run_episode(&cli.message, &cli.scenario).await;

    println!("\n{}", render_summary(&report));

    if let Some(path) = cli.output {
        if let Err(e) = write_report(&path, &report) {
            exit_error(&e.to_string(), None);
        }
        println!("Results saved to: {}", path.display());
    }
}
