//! Walk a breaker through open, probe, recover and re-open
//!
//! Run with `RUST_LOG=ratio_breaker=debug` to see transition logs.

use ratio_breaker::{Breaker, BreakerError, Config};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn successful_service() -> Result<&'static str, String> {
    Ok("ok")
}

fn failing_service() -> Result<&'static str, String> {
    Err("service error".to_string())
}

fn report(i: usize, result: Result<&'static str, BreakerError<String>>) {
    match result {
        Ok(value) => println!("{} {}", i, value),
        Err(BreakerError::Rejected { .. }) => println!("{} rejected, breaker is open", i),
        Err(BreakerError::Execution(e)) => println!("{} service call failed: {}", i, e),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 100 calls tracked, opens at 30% failures, 2s timeout, 11 probes to close
    let config = Config::default();
    let timeout = config.open_timeout;
    let breaker = Breaker::builder("demo")
        .config(config)
        .on_open(|name| println!("breaker '{}' opened", name))
        .on_half_open(|name| println!("breaker '{}' half-open, testing...", name))
        .on_close(|name| println!("breaker '{}' closed", name))
        .build()?;

    println!("--- Sending successful requests ---");
    for i in 0..80 {
        report(i, breaker.call(successful_service));
    }

    println!("--- Sending failing requests ---");
    for i in 0..40 {
        report(i, breaker.call(failing_service));
    }
    println!("state: {}", breaker.state());

    println!("--- Waiting for the open timeout ---");
    std::thread::sleep(timeout + Duration::from_secs(1));

    println!("--- Sending successful requests to recover ---");
    for i in 0..15 {
        report(i, breaker.call(successful_service));
    }
    println!("state: {}", breaker.state());

    println!("--- Sending failing requests to re-open ---");
    for i in 0..40 {
        report(i, breaker.call(failing_service));
    }

    std::thread::sleep(timeout + Duration::from_secs(1));

    println!("--- A failing probe re-opens immediately ---");
    for i in 0..10 {
        report(i, breaker.call(failing_service));
    }
    println!("state: {}", breaker.state());

    Ok(())
}
