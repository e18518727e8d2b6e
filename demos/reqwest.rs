//! Subscribes to an SSE endpoint and prints every message until Ctrl-C
//!
//! Run with: cargo run --example reqwest --features reqwest -- https://example.com/events

use ssefetch::{AttemptError, Handler, Message, Options, RetryDecision};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

struct Printer {
    failures: usize,
}

impl Handler<reqwest::Response> for Printer {
    fn on_message(&mut self, message: Message) {
        self.failures = 0;
        println!("Event type: {}", message.event);
        println!("Data: {}", message.data);
        if !message.id.is_empty() {
            println!("ID: {}", message.id);
        }
        if let Some(retry) = message.retry {
            println!("Retry: {retry}ms");
        }
        println!("---");
    }

    fn on_close(&mut self) {
        println!("Server closed the stream");
    }

    fn on_error(&mut self, error: AttemptError<reqwest::Error>) -> RetryDecision {
        eprintln!("Error: {error}");
        self.failures += 1;

        // stop once the server has rejected us a few times in a row
        if error.is_open() && self.failures >= 3 {
            return RetryDecision::fatal(error.to_string());
        }
        RetryDecision::RetryDefault
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com/events".to_owned());

    let signal = CancellationToken::new();
    let ctrl_c = signal.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    println!("Connecting to {url}...");

    let client = reqwest::Client::new();
    let options = Options::new().signal(signal);
    ssefetch::reqwest::subscribe(client, url, options, Printer { failures: 0 }).await?;

    println!("Stream ended");
    Ok(())
}
