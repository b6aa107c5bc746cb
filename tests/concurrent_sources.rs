//! Scripted sources shared between racing callers.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use faultscript::prelude::*;
use faultscript::ExhaustedSequenceError;

#[test]
fn racing_threads_consume_each_outcome_once() {
    let factory = SyntheticFailureFactory::new();
    let sequence: ScriptedSequence<usize> = (0..200)
        .map(|i| {
            if i % 3 == 0 {
                ScriptedOutcome::Fail(factory.deadlock())
            } else {
                ScriptedOutcome::Success(i)
            }
        })
        .collect();
    let source = Arc::new(ScriptedFailureSource::strict(sequence));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let source = Arc::clone(&source);
            thread::spawn(move || {
                let mut indices = Vec::new();
                while let Ok((index, _)) = source.next_indexed() {
                    indices.push(index);
                }
                indices
            })
        })
        .collect();

    let mut all = BTreeSet::new();
    let mut total = 0;
    for handle in handles {
        let indices = handle.join().unwrap();
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        total += indices.len();
        all.extend(indices);
    }

    assert_eq!(total, 200);
    assert_eq!(all, (0..200).collect::<BTreeSet<_>>());
    assert!(source.is_exhausted());
}

#[test]
fn sticky_tail_under_contention_never_fails() {
    let factory = SyntheticFailureFactory::new();
    let source = Arc::new(ScriptedFailureSource::new(
        ScriptedSequence::new()
            .fail(factory.snapshot_conflict())
            .succeed(1u8),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let source = Arc::clone(&source);
            thread::spawn(move || (0..25).all(|_| source.next().is_ok()))
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(source.calls(), 200);
    assert_eq!(source.cursor(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tasks_see_distinct_indices() {
    let source: Arc<ScriptedFailureSource<usize>> = Arc::new(ScriptedFailureSource::strict(
        (0..64).map(ScriptedOutcome::Success).collect::<ScriptedSequence<_>>(),
    ));

    let tasks = (0..64).map(|_| {
        let source = Arc::clone(&source);
        tokio::spawn(async move { source.next_indexed().map(|(index, _)| index) })
    });
    let results = futures::future::join_all(tasks).await;

    let indices: BTreeSet<usize> = results
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();
    assert_eq!(indices.len(), 64);
    assert_eq!(
        source.next(),
        Err(ExhaustedSequenceError { length: 64, call: 65 })
    );
}
