//! Interactive terminal chat through a confidential inference endpoint
//!
//! Talks to the endpoint named by `ENCLAVE_CHAT_URL` (default
//! `http://localhost:8080`, the usual local proxy address). Set
//! `ENCLAVE_CHAT_API_KEY` when connecting to the endpoint directly;
//! a proxy deployment injects the key itself.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use enclave_chat::client::DEFAULT_CHAT_MODEL;
use enclave_chat::{ChatMessage, ChatRequest, SecureClient};

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let base_url = std::env::var("ENCLAVE_CHAT_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());
    let api_key = std::env::var("ENCLAVE_CHAT_API_KEY").ok();

    println!("Enclave Chat Example");
    println!("====================\n");
    println!("Connecting to {base_url}");
    println!("The secure layer in front of the model handles attestation and");
    println!("transport encryption; this example only speaks the chat API.\n");

    let mut client = match api_key {
        Some(key) => SecureClient::with_api_key(&base_url, key),
        None => SecureClient::new(&base_url),
    };

    client.ready().await?;
    println!("Client ready. Type a message and press Enter (Ctrl-D to quit).\n");

    let mut history: Vec<ChatMessage> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            prompt();
            continue;
        }

        history.push(ChatMessage::user(text));
        let request = ChatRequest::new(DEFAULT_CHAT_MODEL, history.clone());

        let mut reply = String::new();
        let result = client
            .chat_stream(request, |fragment| {
                print!("{fragment}");
                let _ = std::io::stdout().flush();
                reply.push_str(fragment);
            })
            .await;

        match result {
            Ok(()) => {
                println!("\n");
                history.push(ChatMessage::assistant(reply));
            }
            Err(err) => {
                // Failed turns stay out of the history
                println!("\nError: {err}\n");
                history.pop();
            }
        }
        prompt();
    }

    println!();
    Ok(())
}
