//! Flaky Endpoint Example
//!
//! Polls a simulated endpoint that randomly answers 200, 400 or 429 until it
//! answers 200, backing off with jittered binary exponential pauses:
//! - retry budget of 5 attempts
//! - 10 second overall timeout
//! - the operation observes the cancellation token while "in flight"
//!
//! Run with `cargo run --example flaky_endpoint --features tracing` to also
//! see the loop's own debug events.

use std::cell::Cell;
use std::time::Duration;

use rand::Rng;
use rebound::prelude::*;

/// Stand-in for an HTTP GET against a flaky service.
async fn get_status(cancel: &CancellationToken) -> Option<u16> {
    let latency = Duration::from_millis(rand::rng().random_range(50..300));
    tokio::select! {
        _ = cancel.cancelled() => None,
        _ = tokio::time::sleep(latency) => {
            let statuses = [200, 400, 429];
            Some(statuses[rand::rng().random_range(0..statuses.len())])
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .init();

    let tries = 5;
    let timeout = Duration::from_secs(10);
    let last_status = Cell::new(None);
    let last = &last_status;

    let mut backoff = Backoff::new(ExponentialJitter::default_binary()?);
    let result = backoff
        .retry_with_timeout(&CancellationToken::new(), timeout, tries, move |cancel| {
            async move {
                let status = get_status(&cancel).await;
                match status {
                    Some(code) => println!("got: {}", code),
                    None => println!("request cancelled"),
                }
                last.set(status);
                matches!(status, Some(200..=399))
            }
        })
        .await;

    match result {
        Ok(()) => println!("succeeded: {:?}", last_status.get()),
        Err(err) => {
            println!("failed: {} (last status {:?})", err, last_status.get());
            return Err(err.into());
        }
    }
    Ok(())
}
