//! Rishta -- AI Matchmaker Agent
//!
//! The entry point: loads configuration, wires the agent to its tools
//! and the WhatsApp notifier, and hands control to the shell.

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;

use rishta::agent::AgentRunner;
use rishta::config::Settings;
use rishta::gemini::GeminiClient;
use rishta::records::user_records;
use rishta::search::DuckDuckGoSearch;
use rishta::shell::{self, ShellOptions};
use rishta::types::ToolContext;
use rishta::whatsapp::TwilioWhatsApp;

/// Rishta -- AI Matchmaker Agent
#[derive(Parser, Debug)]
#[command(
    name = "rishta",
    version,
    about = "Rishtey Wali Auntie -- AI matchmaker with WhatsApp delivery"
)]
struct Cli {
    /// One-shot request text (skips the interactive prompts)
    #[arg(long)]
    ask: Option<String>,

    /// Minimum age used to pre-assemble the request
    #[arg(long, default_value_t = 20)]
    min_age: u32,

    /// Comma-separated platforms to mention in the request
    #[arg(long, default_value = "Instagram,Facebook")]
    platforms: String,

    /// Do not forward the answer to WhatsApp
    #[arg(long)]
    no_whatsapp: bool,

    /// Print the agent's intermediate tool steps
    #[arg(long)]
    steps: bool,

    /// Print which configuration values are present (secrets masked)
    #[arg(long)]
    debug_env: bool,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::from_env();

    let inference = Arc::new(GeminiClient::new(
        settings.gemini_base_url.clone(),
        settings.gemini_api_key.clone(),
        settings.model.clone(),
        settings.max_tokens,
    ));

    let context = ToolContext {
        records: user_records(),
        search: Arc::new(DuckDuckGoSearch::new()),
    };

    let runner = AgentRunner::new(inference, context, cli.steps);
    let notifier = TwilioWhatsApp::new(settings.twilio.clone());

    let options = ShellOptions {
        min_age: cli.min_age,
        platforms: cli
            .platforms
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        send_whatsapp: !cli.no_whatsapp,
        show_steps: cli.steps,
        debug_env: cli.debug_env,
    };

    match cli.ask {
        Some(ref request) => {
            shell::run_once(&runner, &notifier, &settings, request, &options).await;
        }
        None => {
            shell::run_interactive(&runner, &notifier, &settings, &options).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{}", format!("Fatal: {}", e).red());
        std::process::exit(1);
    }
}
