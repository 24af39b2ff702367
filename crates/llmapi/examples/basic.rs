use anyhow::Result;
use llmapi::{BaseUrl, Client};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

    let mut client = Client::new(api_key, BaseUrl::Poe)?;
    client.set_model("gpt-5")?.system("You are a helpful assistant.")?;

    println!("=== llmapi Basic Usage Demo ===\n");

    println!("[Example 1] Non-streaming mode:");
    println!("Question: What is the capital of China?\n");
    client.user("What is the capital of China?")?;
    match client.request().await {
        Ok(answer) => println!("Answer: {}\n", answer),
        Err(e) => eprintln!("Error: {}\n", e),
    }

    println!("[Example 2] Streaming mode:");
    println!("Question: Convince me to use Rust (100 words)\n");
    client.user("Convince me to use Rust (100 words)")?;
    print!("Answer: ");
    let streamed = client
        .request_stream(|chunk| {
            print!("{}", chunk);
            std::io::stdout().flush().ok();
        })
        .await;
    println!("\n");
    if let Err(e) = streamed {
        eprintln!("Error: {}\n", e);
    }

    let length = client.answer().map(str::len).unwrap_or(0);
    println!("[Verification] Last answer length: {} bytes", length);
    println!("[Verification] Messages in transcript: {}\n", client.message_count());

    println!("=== Demo Complete ===");
    Ok(())
}
