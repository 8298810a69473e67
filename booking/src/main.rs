//! Terminal renderer for the booking flow.
//!
//! Prints the current screen, reads a numbered choice per line and submits
//! the matching action. Choices that need perks prompt for a comma-separated
//! list (`snack, drink, parking`).
//!
//! Enter `s` to print the session as JSON, `q` to quit.

use encore_booking::config::DEFAULT_LOG_FILTER;
use encore_booking::{
    BookingRegistry, Catalog, Config, FlowEnvironment, FlowEvent, PerkSelection, Screen, Session,
    SessionId, StepMachine,
};
use encore_core::environment::SystemClock;
use encore_core::event::EventRecord;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    // Logs go to stderr so screens stay readable
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let catalog: Arc<dyn Catalog> = Arc::new(config.load_catalog()?);
    let environment = FlowEnvironment::new(Arc::clone(&catalog), Arc::new(SystemClock));
    let registry = BookingRegistry::new(StepMachine::new(), environment);

    let session_id = SessionId::new();
    let store = registry.open(session_id).await;
    info!(session = %session_id, "Booking session started");

    let mut events = store.subscribe();
    let observer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match EventRecord::from_event(&event) {
                    Ok(record) => tracing::debug!(%record, "Flow event"),
                    Err(e) => warn!(error = %e, "Failed to encode flow event"),
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event observer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let screen = store.state(|s| Screen::render(s, catalog.as_ref())).await;
        if config.debug_step {
            println!("Debug: Current Step -> {}", screen.step);
        }
        println!("{screen}");
        prompt(&format!("Choose 1-{} (s = session, q = quit): ", screen.choices.len()))?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        match input {
            "q" | "quit" => break,
            "s" => {
                let json = store.state(Session::to_json).await?;
                println!("{json}\n");
                continue;
            },
            _ => {},
        }

        let Some(choice) = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| screen.choices.get(index))
        else {
            println!("Unknown choice '{input}'\n");
            continue;
        };

        let action = if choice.asks_for_perks {
            prompt("Perks (snack, drink, parking; blank for none): ")?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            match line.parse::<PerkSelection>() {
                Ok(perks) => choice.action_with_perks(perks),
                Err(e) => {
                    println!("{e}\n");
                    continue;
                },
            }
        } else {
            choice.action.clone()
        };

        match store.send(action).await {
            Ok(emitted) => {
                let perks_only = emitted.len() == 1
                    && matches!(emitted.first(), Some(FlowEvent::PerksUpdated { .. }));
                if perks_only {
                    println!("Your perks have been updated!\n");
                }
            },
            Err(e) => println!("Error: {e}\n"),
        }
    }

    // Dropping the last handle closes the channel, so the observer drains
    // what is left and exits
    registry.close(&session_id).await;
    drop(store);
    observer.await?;
    info!(session = %session_id, "Booking session ended");
    Ok(())
}

fn prompt(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}
