use anyhow::Result;
use llmapi::blocking::Client;
use llmapi::BaseUrl;
use std::io::{BufRead, Write};

// Same loop as the llmapi-chat binary, on the blocking client.
fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

    let mut client = Client::new(api_key, BaseUrl::Poe)?;
    client.set_model("gpt-5")?.system("You are a helpful assistant.")?;

    println!("AI Chat CLI - Type 'quit' to exit\n");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let input = line?;
        let input = input.trim();

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
        let result = client.request_stream(|chunk| {
            print!("{}", chunk);
            std::io::stdout().flush().ok();
        });
        match result {
            Ok(_) => println!("\n"),
            Err(e) => println!("\nError: {}\n", e),
        }
    }

    Ok(())
}
