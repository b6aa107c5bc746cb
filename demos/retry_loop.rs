//! Retry Loop Example
//!
//! Drives a retry loop against a scripted dependency and logs every decision.
//!
//! Run with: cargo run --example retry_loop --features tracing

use std::time::Duration;

use faultscript::prelude::*;
use faultscript::{RetryEvent, ThreadSleep};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let factory = SyntheticFailureFactory::new();

    println!("=== Transient failures, then success ===");
    let source = ScriptedFailureSource::new(
        ScriptedSequence::new()
            .fail(factory.deadlock())
            .fail(factory.lock_timeout())
            .succeed("order 17 saved"),
    );
    let policy = RetryPolicy::new(4).with_backoff(Backoff::exponential(Duration::from_millis(20)));
    let executor = RetryExecutor::new()
        .with_pause(ThreadSleep)
        .on_retry(|event: &RetryEvent<'_>| {
            println!(
                "  attempt {} failed: {} (next try in {:?})",
                event.attempt, event.failure, event.next_delay
            );
        });

    let report = executor.execute_with_report(|| next_call(&source), &policy);
    println!("  result: {:?} after {} attempts\n", report.result, report.attempts);

    println!("=== Coordinator abort is surfaced ===");
    let source = ScriptedFailureSource::new(
        ScriptedSequence::new()
            .fail(factory.create_transaction_abort("commit timed out in coordinator"))
            .succeed("never reached"),
    );
    let report = executor.execute_with_report(|| next_call(&source), &policy);
    println!(
        "  decision: {:?}, attempts: {}\n",
        report.final_decision, report.attempts
    );

    println!("=== Strict script runs out ===");
    let source = ScriptedFailureSource::strict(
        ScriptedSequence::<&str>::new().fail_times(factory.command_timeout(), 2),
    );
    for _ in 0..3 {
        match source.next() {
            Ok(outcome) => println!("  {:?}", outcome.failure().map(|d| d.category())),
            Err(err) => println!("  {}", err),
        }
    }
}

fn next_call(source: &ScriptedFailureSource<&'static str>) -> Result<&'static str, FailureDescriptor> {
    match source.next() {
        Ok(outcome) => outcome.into_result(),
        Err(err) => panic!("demo script misconfigured: {}", err),
    }
}
