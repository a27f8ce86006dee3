use anyhow::{anyhow, Context, Result};
use bat::PrettyPrinter;
use clap::Parser;
use cliclack::{input, spinner};
use console::style;
use reqwest::Client;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use forecast_agent::agent::{Agent, AgentConfig, Outcome, Reply, DEFAULT_MAX_ROUNDS};
use forecast_agent::providers::configs::openai::OpenAiProviderConfig;
use forecast_agent::providers::openai::OpenAiProvider;
use forecast_agent::tools::{default_registry, ToolEndpoints};

const DEFAULT_PROMPT: &str = "Please suggest some activities based on my location and the weather.";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OpenAI API Key (can also be set via OPENAI_API_KEY environment variable)
    #[arg(short, long)]
    api_key: Option<String>,

    /// Model to use (defaults to OPENAI_MODEL, then gpt-4o)
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum number of provider rounds per conversation
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_ROUNDS)]
    max_rounds: usize,

    /// Deadline in seconds for each completion request and tool call
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Keep asking for prompts until "exit"
    #[arg(short, long)]
    interactive: bool,

    /// Prompt to answer
    #[arg(default_value = DEFAULT_PROMPT)]
    prompt: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries the answer
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut provider_config = OpenAiProviderConfig::from_env_with_key(cli.api_key)
        .context("API key must be provided via --api-key or OPENAI_API_KEY environment variable")?;
    if let Some(model) = cli.model {
        provider_config = provider_config.with_model(model);
    }

    let provider = OpenAiProvider::new(provider_config)?;
    let registry = default_registry(Client::new(), &ToolEndpoints::default())?;
    let config = AgentConfig {
        max_rounds: cli.max_rounds,
        round_timeout: cli.timeout.map(Duration::from_secs),
        ..AgentConfig::default()
    };
    let agent = Agent::new(Box::new(provider), registry, config)?;

    if !cli.interactive {
        return answer(&agent, &cli.prompt).await;
    }

    println!(
        "Example forecast agent {}",
        style("- type \"exit\" to end the session").dim()
    );
    println!("\n");

    loop {
        let message_text: String = input("Message:").placeholder("").multiline().interact()?;

        if message_text.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        // Each prompt gets its own conversation, a failed one does not end the session
        if let Err(err) = answer(&agent, &message_text).await {
            println!("{}", style(failure_message(&err)).red());
        }
        println!("\n");
    }
    Ok(())
}

async fn answer(agent: &Agent, prompt: &str) -> Result<()> {
    let spin = spinner();
    spin.start("awaiting reply");
    let reply = agent.run_conversation(prompt).await;
    spin.stop("");

    let Reply {
        text,
        rounds_used,
        outcome,
    } = reply?;
    println!("\n{}\n", rounds_headline(rounds_used));
    match outcome {
        Outcome::Answered => render(&text),
        Outcome::RoundsExhausted => {
            println!("{}", style(text).yellow());
            Ok(())
        }
    }
}

fn rounds_headline(rounds_used: usize) -> String {
    format!("Response obtained in {} rounds:", rounds_used)
}

fn failure_message(err: &anyhow::Error) -> String {
    format!("Error: {:#}", err)
}

fn render(content: &str) -> Result<()> {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .map_err(|e| anyhow!("failed to render reply: {}", e))?;
    Ok(())
}
