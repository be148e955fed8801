use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};

use docdesk::commands::{self, Command};
use docdesk::docs::filter::ListFilter;
use docdesk::{Desk, DeskConfig, DeskEvent, HttpApi};

enum Input {
    Line(Option<String>),
    Settled(DeskEvent),
}

// Single-threaded: input handling and settlement never interleave.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenv::dotenv();
    let config = DeskConfig::from_env();

    let api = Arc::new(HttpApi::new(&config.api_url)?);
    info!(api_url = %api.base_url(), debounce_ms = config.sync.debounce.as_millis() as u64, "docdesk starting");

    let mut desk = Desk::new(api, &config.sync);
    desk.load(ListFilter::All);

    println!("docdesk: connected to {} (type `help`)", config.api_url);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line.context("Failed to read stdin")?),
            Some(event) = desk.next_event() => Input::Settled(event),
        };

        match input {
            Input::Settled(event) => {
                let kind = event.kind();
                if desk.apply(event) {
                    if let Some(text) = commands::settled(&desk, kind) {
                        println!("{}", text);
                    }
                }
            }
            Input::Line(None) => break,
            Input::Line(Some(line)) => match Command::parse(&line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => break,
                Ok(Some(cmd)) => match commands::dispatch(&mut desk, cmd).await {
                    Ok(text) if !text.is_empty() => println!("{}", text),
                    Ok(_) => {}
                    Err(e) => println!("Error: {:#}", e),
                },
                Err(msg) => println!("{}", msg),
            },
        }
    }

    let pending = desk.pending_writes();
    if pending > 0 {
        info!(pending, "flushing edits before exit");
        desk.flush().await;
    }
    Ok(())
}
