//! Tests for scripted sequences and sources.

use super::*;
use crate::{ExhaustedSequenceError, FailureCategory, SyntheticFailureFactory};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn timeout_then_42() -> ScriptedSequence<i32> {
    let factory = SyntheticFailureFactory::new();
    ScriptedSequence::new()
        .fail_times(factory.command_timeout(), 2)
        .succeed(42)
}

#[test]
fn plays_back_in_order() {
    let source = ScriptedFailureSource::new(timeout_then_42());

    let first = source.next().unwrap();
    assert_eq!(
        first.failure().map(|d| d.category()),
        Some(FailureCategory::CommandTimeout)
    );
    assert!(source.next().unwrap().is_fail());
    assert_eq!(source.next().unwrap(), ScriptedOutcome::Success(42));
    assert_eq!(source.calls(), 3);
    assert!(source.is_exhausted());
}

#[test]
fn sticky_tail_repeats_last_outcome() {
    let source = ScriptedFailureSource::new(timeout_then_42());
    for _ in 0..3 {
        source.next().unwrap();
    }
    for _ in 0..5 {
        assert_eq!(source.next().unwrap(), ScriptedOutcome::Success(42));
    }
    assert_eq!(source.cursor(), 3);
    assert_eq!(source.calls(), 8);
}

#[test]
fn strict_fails_exactly_after_the_last_outcome() {
    let factory = SyntheticFailureFactory::new();
    let source = ScriptedFailureSource::strict(
        ScriptedSequence::new()
            .fail(factory.deadlock())
            .succeed("ok"),
    );

    assert!(source.next().is_ok());
    assert!(source.next().is_ok());
    assert_eq!(
        source.next().unwrap_err(),
        ExhaustedSequenceError { length: 2, call: 3 }
    );
    assert_eq!(
        source.next().unwrap_err(),
        ExhaustedSequenceError { length: 2, call: 4 }
    );
}

#[test]
fn empty_script_is_exhausted_in_both_modes() {
    let sticky = ScriptedFailureSource::<u8>::new(ScriptedSequence::new());
    let strict = ScriptedFailureSource::<u8>::strict(ScriptedSequence::new());

    assert!(sticky.is_empty());
    assert_eq!(
        sticky.next().unwrap_err(),
        ExhaustedSequenceError { length: 0, call: 1 }
    );
    assert_eq!(
        strict.next().unwrap_err(),
        ExhaustedSequenceError { length: 0, call: 1 }
    );
}

#[test]
fn reset_replays_from_the_start() {
    let source = ScriptedFailureSource::new(timeout_then_42());
    let first = source.next().unwrap();
    source.next().unwrap();

    source.reset();

    assert_eq!(source.cursor(), 0);
    assert_eq!(source.calls(), 0);
    assert_eq!(source.next().unwrap(), first);
}

#[test]
fn reset_clears_strict_exhaustion() {
    let source = ScriptedFailureSource::strict(vec![ScriptedOutcome::Success(1)]);
    source.next().unwrap();
    assert!(source.next().is_err());

    source.reset();
    assert_eq!(source.next().unwrap(), ScriptedOutcome::Success(1));
}

#[test]
fn remaining_counts_down() {
    let source = ScriptedFailureSource::new(timeout_then_42());
    assert_eq!(source.remaining(), 3);
    source.next().unwrap();
    assert_eq!(source.remaining(), 2);
}

#[test]
fn outcome_source_yields_results() {
    let source = ScriptedFailureSource::new(timeout_then_42());
    let dependency: &dyn OutcomeSource<i32> = &source;

    assert!(dependency.next_result().unwrap().is_err());
    assert!(dependency.next_result().unwrap().is_err());
    assert_eq!(dependency.next_result().unwrap(), Ok(42));
}

#[test]
fn concurrent_callers_receive_distinct_indices() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    let sequence: ScriptedSequence<usize> = (0..THREADS * PER_THREAD)
        .map(ScriptedOutcome::Success)
        .collect();
    let source = Arc::new(ScriptedFailureSource::strict(sequence));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let source = Arc::clone(&source);
            thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|_| source.next_indexed().unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        let mut previous = None;
        for (index, outcome) in handle.join().unwrap() {
            // The script maps index i to value i.
            assert_eq!(outcome, ScriptedOutcome::Success(index));
            assert!(previous.is_none_or(|p| p < index));
            previous = Some(index);
            assert!(seen.insert(index), "index {} handed out twice", index);
        }
    }

    assert_eq!(seen.len(), THREADS * PER_THREAD);
    assert!(source.next().is_err());
}

#[test]
fn sequence_builders() {
    let factory = SyntheticFailureFactory::new();
    let seq = ScriptedSequence::new()
        .fail_times(factory.deadlock(), 3)
        .then(ScriptedOutcome::Success(()))
        .fail(factory.lock_timeout());

    assert_eq!(seq.len(), 5);
    assert!(seq.outcomes()[3].is_success());
    assert!(ScriptedSequence::<()>::default().is_empty());
}

#[test]
fn outcome_result_conversions() {
    let d = SyntheticFailureFactory::new().deadlock();
    let fail: ScriptedOutcome<i32> = Err(d.clone()).into();
    assert_eq!(fail.into_result(), Err(d));

    let ok: ScriptedOutcome<i32> = Ok(5).into();
    assert_eq!(ok.into_result(), Ok(5));
}

#[cfg(feature = "tracing")]
mod tracing_tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn strict_exhaustion_is_logged() {
        let source = ScriptedFailureSource::<i32>::strict(ScriptedSequence::new());
        let _ = source.next();
        assert!(logs_contain("scripted sequence exhausted"));
    }
}
