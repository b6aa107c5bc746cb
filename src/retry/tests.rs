//! Integration tests for retry functionality.

use super::*;
use crate::{
    Decision, FailureCategory, FailureDescriptor, PolicyOverrides, ScriptedFailureSource,
    ScriptedSequence, SyntheticFailureFactory,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn scripted(source: &ScriptedFailureSource<i32>) -> impl FnMut() -> Result<i32, FailureDescriptor> + '_ {
    move || source.next().expect("script exhausted").into_result()
}

fn two_timeouts_then_42() -> ScriptedFailureSource<i32> {
    let factory = SyntheticFailureFactory::new();
    ScriptedFailureSource::new(
        ScriptedSequence::new()
            .fail_times(factory.command_timeout(), 2)
            .succeed(42),
    )
}

#[test]
fn succeeds_on_third_attempt() {
    let source = two_timeouts_then_42();
    let executor = RetryExecutor::new().with_pause(NoPause);

    let report = executor.execute_with_report(scripted(&source), &RetryPolicy::new(3));

    assert_eq!(report.result, Ok(42));
    assert_eq!(report.attempts, 3);
    assert_eq!(report.final_decision, None);
    assert_eq!(source.calls(), 3);
}

#[test]
fn stops_at_max_attempts_with_last_failure() {
    let source = two_timeouts_then_42();
    let executor = RetryExecutor::new().with_pause(NoPause);

    let report = executor.execute_with_report(scripted(&source), &RetryPolicy::new(2));

    let failure = report.failure().unwrap();
    assert_eq!(failure.code(), Some(-2));
    assert_eq!(report.attempts, 2);
    assert!(report.exhausted());
    assert_eq!(source.calls(), 2);
}

#[test]
fn returns_the_last_failure_not_the_first() {
    let factory = SyntheticFailureFactory::new();
    let source = ScriptedFailureSource::new(
        ScriptedSequence::new()
            .fail(factory.deadlock())
            .fail(factory.snapshot_conflict()),
    );

    let result = RetryExecutor::new()
        .with_pause(NoPause)
        .execute(scripted(&source), &RetryPolicy::new(2));

    assert_eq!(result.unwrap_err().code(), Some(3960));
}

#[test]
fn surfaced_failure_is_not_retried() {
    let factory = SyntheticFailureFactory::new();
    let calls = AtomicU32::new(0);

    let report = RetryExecutor::new().with_pause(NoPause).execute_with_report(
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(factory.create_transaction_abort("dtc"))
        },
        &RetryPolicy::new(5),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(report.final_decision, Some(Decision::Surface));
    assert!(!report.exhausted());
}

#[test]
fn unknown_failure_is_not_retried() {
    let factory = SyntheticFailureFactory::new();
    let calls = AtomicU32::new(0);

    let result = RetryExecutor::new().with_pause(NoPause).execute(
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(factory.create(2627, None))
        },
        &RetryPolicy::new(5),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.unwrap_err().category(), FailureCategory::Unknown);
}

#[test]
fn category_outside_retryable_set_aborts() {
    let source = two_timeouts_then_42();
    let policy = RetryPolicy::new(3).with_retryable_categories([FailureCategory::Deadlock]);

    let report = RetryExecutor::new()
        .with_pause(NoPause)
        .execute_with_report(scripted(&source), &policy);

    assert_eq!(report.final_decision, Some(Decision::Abort));
    assert_eq!(report.attempts, 1);
}

#[test]
fn override_can_make_transaction_abort_retryable() {
    let factory = SyntheticFailureFactory::new();
    let source = ScriptedFailureSource::new(
        ScriptedSequence::new()
            .fail(factory.create_transaction_abort("first"))
            .succeed(1),
    );
    let policy = RetryPolicy::new(2)
        .with_overrides(PolicyOverrides::new().allow(FailureCategory::TransactionAbort));

    let result = RetryExecutor::new()
        .with_pause(NoPause)
        .execute(scripted(&source), &policy);

    assert_eq!(result, Ok(1));
}

#[test]
fn single_attempt_policy_never_retries() {
    let source = two_timeouts_then_42();
    let clock = VirtualClock::new();

    let report = RetryExecutor::new()
        .with_pause(clock.clone())
        .execute_with_report(scripted(&source), &RetryPolicy::no_retry());

    assert_eq!(report.attempts, 1);
    assert!(report.exhausted());
    assert_eq!(clock.pause_count(), 0);
}

#[test]
fn pauses_follow_backoff_and_sit_between_attempts() {
    let source = two_timeouts_then_42();
    let clock = VirtualClock::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let policy = RetryPolicy::new(3).with_backoff(Backoff::linear(Duration::from_millis(10)));
    let report = RetryExecutor::new().with_pause(clock.clone()).execute_with_report(
        {
            let log = Arc::clone(&log);
            let clock = clock.clone();
            move || {
                // Pauses taken before this attempt.
                log.lock().unwrap().push(clock.pause_count());
                source.next().unwrap().into_result()
            }
        },
        &policy,
    );

    assert_eq!(report.result, Ok(42));
    assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    assert_eq!(
        clock.pauses(),
        vec![Duration::from_millis(10), Duration::from_millis(20)]
    );
    assert_eq!(report.total_delay, Duration::from_millis(30));
}

#[test]
fn hook_sees_each_retry() {
    let source = two_timeouts_then_42();
    let events = Arc::new(Mutex::new(Vec::new()));

    let executor = RetryExecutor::new().with_pause(NoPause).on_retry({
        let events = Arc::clone(&events);
        move |event: &RetryEvent<'_>| {
            events
                .lock()
                .unwrap()
                .push((event.attempt, event.failure.code(), event.next_delay));
        }
    });
    let policy = RetryPolicy::new(3).with_backoff(Backoff::constant(Duration::from_millis(5)));

    assert_eq!(executor.execute(scripted(&source), &policy), Ok(42));
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            (1, Some(-2), Duration::from_millis(5)),
            (2, Some(-2), Duration::from_millis(5)),
        ]
    );
}

#[test]
fn hook_is_not_called_when_giving_up() {
    let factory = SyntheticFailureFactory::new();
    let hook_calls = Arc::new(AtomicU32::new(0));

    let executor = RetryExecutor::new().with_pause(NoPause).on_retry({
        let hook_calls = Arc::clone(&hook_calls);
        move |_: &RetryEvent<'_>| {
            hook_calls.fetch_add(1, Ordering::SeqCst);
        }
    });

    let _ = executor.execute(|| Err::<(), _>(factory.deadlock()), &RetryPolicy::new(1));
    assert_eq!(hook_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn executor_is_debug() {
    let executor = RetryExecutor::new().on_retry(|_: &RetryEvent<'_>| {});
    let debug = format!("{:?}", executor);
    assert!(debug.contains("RetryExecutor"));
    assert!(debug.contains("<hook>"));
}

#[cfg(feature = "async")]
mod async_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn async_executor_retries_with_tokio_clock() {
        let source = two_timeouts_then_42();
        let policy = RetryPolicy::new(3).with_backoff(Backoff::constant(Duration::from_secs(30)));
        let start = tokio::time::Instant::now();

        let report = RetryExecutor::new()
            .execute_async(|| async { source.next().unwrap().into_result() }, &policy)
            .await;

        assert_eq!(report.result, Ok(42));
        assert_eq!(report.attempts, 3);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn async_executor_respects_max_attempts() {
        let source = two_timeouts_then_42();

        let report = RetryExecutor::new()
            .execute_async(|| async { source.next().unwrap().into_result() }, &RetryPolicy::new(2))
            .await;

        assert!(report.exhausted());
        assert_eq!(source.calls(), 2);
    }
}

#[cfg(feature = "tracing")]
mod tracing_tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn retries_and_give_up_are_logged() {
        let source = two_timeouts_then_42();
        let _ = RetryExecutor::new()
            .with_pause(NoPause)
            .execute(scripted(&source), &RetryPolicy::new(2));

        assert!(logs_contain("retrying after failure"));
        assert!(logs_contain("giving up"));
    }
}
