mod config;

use anyhow::Context;
use llmapi::Client;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ChatConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ChatConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);
    tracing::info!(base_url = %config.base_url, model = %config.model, "starting chat");

    let mut client =
        Client::from_config(config.client_config()).context("Failed to create client")?;
    client.system(config.system_prompt.as_str())?;

    println!("AI Chat CLI - Type 'quit' to exit\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        if input == "quit" || input == "q" {
            println!("\nBye!");
            break;
        }
        if input.is_empty() {
            continue;
        }

        if let Err(e) = client.user(input) {
            println!("\nError: {}\n", e);
            continue;
        }

        print!("\nAI: ");
        let result = client
            .request_stream(|chunk| {
                print!("{}", chunk);
                std::io::stdout().flush().ok();
            })
            .await;

        match result {
            Ok(_) => println!("\n"),
            Err(e) => {
                tracing::warn!(error = %e, "turn failed");
                println!("\nError: {}\n", e);
            }
        }
    }

    Ok(())
}

// Logs go to stderr so they never interleave with the streamed answer.
fn init_logging(config: &ChatConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}
