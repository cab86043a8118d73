//! Presentation Shell
//!
//! Collects one matchmaking request (interactively or from the command
//! line), runs it through the agent exactly once, renders the outcome,
//! and optionally forwards the answer to WhatsApp. All pipeline failures
//! surface here and nowhere else.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input, MultiSelect};

use crate::agent::system_prompt::AGENT_NAME;
use crate::agent::AgentRunner;
use crate::config::Settings;
use crate::types::Notifier;

/// Platforms offered in the interactive multi-select.
const PLATFORMS: [&str; 4] = ["LinkedIn", "Instagram", "Facebook", "TikTok"];

/// Shell behavior flags, seeded from the command line.
#[derive(Clone, Debug)]
pub struct ShellOptions {
    pub min_age: u32,
    pub platforms: Vec<String>,
    pub send_whatsapp: bool,
    pub show_steps: bool,
    pub debug_env: bool,
}

/// What happened to the outbound notification for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The user did not ask for a notification.
    NotRequested,
    /// The answer was delivered.
    Sent,
    /// The answer was computed but delivery failed. This is a distinct
    /// partial state, not a whole-pipeline failure.
    Failed(String),
}

/// The result of one full pipeline run: the outcome plus delivery status.
#[derive(Debug)]
pub struct PipelineReport {
    pub outcome: crate::types::AgentOutcome,
    pub delivery: DeliveryStatus,
}

/// Run one request through the agent and, on success, optionally forward
/// the final text to the notifier. A runner failure propagates before the
/// notifier is ever touched; a notifier failure is captured as a partial
/// state so the answer is not lost.
pub async fn run_pipeline(
    runner: &AgentRunner,
    notifier: &dyn Notifier,
    request: &str,
    notify: bool,
) -> crate::error::Result<PipelineReport> {
    let outcome = runner.run(request).await?;

    let delivery = if notify {
        match notifier.send(&outcome.final_text).await {
            Ok(()) => DeliveryStatus::Sent,
            Err(e) => DeliveryStatus::Failed(e.to_string()),
        }
    } else {
        DeliveryStatus::NotRequested
    };

    Ok(PipelineReport { outcome, delivery })
}

/// Pre-assemble the free-text request from the structured sub-fields.
pub fn assemble_request(min_age: u32, platforms: &[String]) -> String {
    format!(
        "Find a match of {} minimum age and tell me the details from {}.",
        min_age,
        platforms.join(", ")
    )
}

// ─── Interactive Flow ────────────────────────────────────────────

pub fn show_banner() {
    println!();
    println!("{}", "  Rishtey Wali Auntie -- AI Matchmaker".cyan().bold());
    println!(
        "{}",
        "  Your personal rishta expert: finds matches and digs up the\n  social media details, in classic desi style.\n"
            .dimmed()
    );
}

/// Walk the user through the request form and run the pipeline once.
pub async fn run_interactive(
    runner: &AgentRunner,
    notifier: &dyn Notifier,
    settings: &Settings,
    options: &ShellOptions,
) -> Result<()> {
    show_banner();

    let min_age: u32 = Input::new()
        .with_prompt(format!("  {} Minimum age (18-40)", "\u{2192}".cyan()))
        .default(options.min_age)
        .validate_with(|v: &u32| -> std::result::Result<(), String> {
            if (18..=40).contains(v) {
                Ok(())
            } else {
                Err("Minimum age must be between 18 and 40.".to_string())
            }
        })
        .interact_text()?;

    let defaults: Vec<bool> = PLATFORMS
        .iter()
        .map(|p| options.platforms.iter().any(|sel| sel == p))
        .collect();
    let picked = MultiSelect::new()
        .with_prompt(format!("  {} Platforms to search", "\u{2192}".cyan()))
        .items(&PLATFORMS)
        .defaults(&defaults)
        .interact()?;
    let platforms: Vec<String> = picked.iter().map(|&i| PLATFORMS[i].to_string()).collect();

    let request: String = Input::new()
        .with_prompt(format!("  {} Custom request", "\u{2192}".cyan()))
        .default(assemble_request(min_age, &platforms))
        .interact_text()?;

    let send_whatsapp = Confirm::new()
        .with_prompt(format!("  {} Send result to WhatsApp?", "\u{2192}".cyan()))
        .default(options.send_whatsapp)
        .interact()?;

    let show_steps = Confirm::new()
        .with_prompt(format!("  {} Show {}'s reasoning steps?", "\u{2192}".cyan(), AGENT_NAME))
        .default(options.show_steps)
        .interact()?;

    if options.debug_env {
        print_debug_panel(settings);
    }

    execute(runner, notifier, &request, send_whatsapp, show_steps).await;
    Ok(())
}

/// Run one pre-assembled request without prompting.
pub async fn run_once(
    runner: &AgentRunner,
    notifier: &dyn Notifier,
    settings: &Settings,
    request: &str,
    options: &ShellOptions,
) {
    if options.debug_env {
        print_debug_panel(settings);
    }
    execute(runner, notifier, request, options.send_whatsapp, options.show_steps).await;
}

/// The single boundary where every pipeline failure becomes user-visible
/// output. Nothing below this swallows an error.
async fn execute(
    runner: &AgentRunner,
    notifier: &dyn Notifier,
    request: &str,
    notify: bool,
    show_steps: bool,
) {
    println!();
    println!(
        "{}",
        format!("  {} is searching for rishta...", AGENT_NAME).dimmed()
    );

    match run_pipeline(runner, notifier, request, notify).await {
        Ok(report) => render_report(&report, show_steps),
        Err(e) => println!("{}", format!("\n  Error: {}", e).red()),
    }
}

fn render_report(report: &PipelineReport, show_steps: bool) {
    println!();
    println!("{}", "  Rishta found!".green().bold());
    println!("{}", format!("  {} says:\n", AGENT_NAME).white());
    for line in report.outcome.final_text.lines() {
        println!("  {}", line);
    }

    if show_steps && !report.outcome.steps.is_empty() {
        println!();
        println!("{}", format!("  {}'s reasoning:", AGENT_NAME).cyan());
        for (i, step) in report.outcome.steps.iter().enumerate() {
            println!("{}", format!("  Step {}: {}", i + 1, step.input).white());
            println!("{}", format!("          {}", step.output).dimmed());
        }
    }

    println!();
    match &report.delivery {
        DeliveryStatus::Sent => {
            println!("{}", "  Message sent to your WhatsApp.".green());
        }
        DeliveryStatus::Failed(reason) => {
            // Partial state: the answer above still stands.
            println!(
                "{}",
                format!("  Answer found, but WhatsApp delivery failed: {}", reason).yellow()
            );
        }
        DeliveryStatus::NotRequested => {}
    }
}

fn print_debug_panel(settings: &Settings) {
    println!();
    println!("{}", "  Environment debug info".cyan());
    for (label, value) in settings.debug_report() {
        println!("  {:24} {}", label.white(), value.dimmed());
    }
}
