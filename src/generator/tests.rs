use super::*;
use crate::{FnSink, ManualClock, SinkError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread;

/// 2024-01-01T00:00:00Z
const NEW_YEAR_2024: i64 = 1_704_067_200_000;
const NODE: NodeId = NodeId::new(*b"abcdef");

fn manual(unix_ts_ms: i64) -> (Arc<ManualClock>, Generator<Arc<ManualClock>>) {
    let clock = Arc::new(ManualClock::new(unix_ts_ms));
    let g = Generator::new(Arc::clone(&clock), NODE);
    (clock, g)
}

/// Generates unique identifiers from concurrent callers
#[test]
fn generates_unique_identifiers_from_concurrent_callers() {
    const N_THREADS: usize = 16;
    const N_PER_THREAD: usize = 250;

    let g = Generator::system(NODE);
    let ids: Vec<UniqueId> = thread::scope(|s| {
        let handles: Vec<_> = (0..N_THREADS)
            .map(|_| {
                s.spawn(|| {
                    (0..N_PER_THREAD)
                        .map(|_| g.generate().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let unique: HashSet<&UniqueId> = ids.iter().collect();
    assert_eq!(unique.len(), N_THREADS * N_PER_THREAD);
}

/// Hands identifiers to the sink in increasing order under contention
#[test]
fn hands_identifiers_to_the_sink_in_increasing_order_under_contention() {
    let seen = StdMutex::new(Vec::new());
    let sink = FnSink(|id: &UniqueId, _: DayBucket| {
        seen.lock().unwrap().push(*id);
        Ok::<_, SinkError>(())
    });
    let g = Generator::with_sink(SystemClock, NODE, sink);

    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..500 {
                    g.generate().unwrap();
                    thread::yield_now();
                }
            });
        }
    });
    drop(g);

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 4_000);
    for pair in seen.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

/// Generates sortable identifiers by creation time
#[test]
fn generates_sortable_identifiers_by_creation_time() {
    let g = Generator::system(NODE);
    let mut prev = g.generate().unwrap();
    for i in 0..20_000 {
        if i == 10_000 {
            thread::sleep(std::time::Duration::from_millis(10));
        }
        let curr = g.generate().unwrap();
        assert!(prev < curr);
        assert!(prev.to_string() < curr.to_string());
        if prev.timestamp() == curr.timestamp() {
            assert!(prev.sequence() < curr.sequence());
        }
        prev = curr;
    }
}

/// Generates canonical string
#[test]
fn generates_canonical_string() {
    let pattern = r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-616263646566$";
    let re = regex::Regex::new(pattern).unwrap();
    let g = Generator::system(NODE);
    for _ in 0..1_000 {
        assert!(re.is_match(&g.generate().unwrap().to_string()));
    }
}

/// Encodes up-to-date timestamp and configured node identifier
#[test]
fn encodes_up_to_date_timestamp_and_configured_node_identifier() {
    let g = Generator::random();
    let node_id = g.node_id();
    for _ in 0..10_000 {
        let ts_now = SystemClock.unix_ts_ms();
        let e = g.generate().unwrap();
        assert!((ts_now - e.timestamp()).abs() < 16);
        assert_eq!(e.node_id(), node_id);
    }
}

/// Increments sequence within the same millisecond and resets it on the next
#[test]
fn increments_sequence_within_the_same_millisecond_and_resets_it_on_the_next() {
    let (clock, g) = manual(NEW_YEAR_2024);

    let first = g.generate().unwrap();
    assert_eq!(first, UniqueId::new(NEW_YEAR_2024, 0, NODE));
    assert_eq!(first.to_string(), "0000018c-c251-f400-0000-616263646566");
    for seq in 1..100 {
        assert_eq!(g.generate().unwrap(), UniqueId::new(NEW_YEAR_2024, seq, NODE));
    }

    clock.advance(1);
    assert_eq!(g.generate().unwrap(), UniqueId::new(NEW_YEAR_2024 + 1, 0, NODE));
    clock.advance(1_000);
    assert_eq!(g.generate().unwrap(), UniqueId::new(NEW_YEAR_2024 + 1_001, 0, NODE));
}

/// Starts from any first timestamp including negative ones
#[test]
fn starts_from_any_first_timestamp_including_negative_ones() {
    for ts in [i64::MIN, -1, 0, 1] {
        let (_, g) = manual(ts);
        let e = g.generate();
        if DayBucket::from_unix_ts_ms(ts).is_some() {
            assert_eq!(e.unwrap(), UniqueId::new(ts, 0, NODE));
        } else {
            assert!(matches!(e, Err(Error::PersistenceFailure(_))));
        }
    }
}

/// Fails closed on clock regression and recovers once the clock catches up
#[test]
fn fails_closed_on_clock_regression_and_recovers_once_the_clock_catches_up() {
    let (clock, g) = manual(NEW_YEAR_2024);
    assert_eq!(g.generate().unwrap().sequence(), 0);

    clock.set(NEW_YEAR_2024 - 1);
    for _ in 0..3 {
        assert!(matches!(
            g.generate(),
            Err(Error::ClockRegression { last: NEW_YEAR_2024, now }) if now == NEW_YEAR_2024 - 1
        ));
    }

    // state is as it was before the failing calls
    clock.set(NEW_YEAR_2024);
    assert_eq!(g.generate().unwrap(), UniqueId::new(NEW_YEAR_2024, 1, NODE));
    clock.set(NEW_YEAR_2024 + 1);
    assert_eq!(g.generate().unwrap(), UniqueId::new(NEW_YEAR_2024 + 1, 0, NODE));
}

/// Fails when sequence is exhausted and recovers on the next millisecond
#[test]
fn fails_when_sequence_is_exhausted_and_recovers_on_the_next_millisecond() {
    let (clock, g) = manual(NEW_YEAR_2024);

    for seq in 0..MAX_SEQUENCE {
        assert_eq!(g.generate().unwrap().sequence(), seq);
    }
    for _ in 0..3 {
        assert!(matches!(
            g.generate(),
            Err(Error::SequenceExhausted { timestamp: NEW_YEAR_2024 })
        ));
    }

    clock.advance(1);
    assert_eq!(g.generate().unwrap(), UniqueId::new(NEW_YEAR_2024 + 1, 0, NODE));
}

/// Surfaces sink failure after consuming the identifier
#[test]
fn surfaces_sink_failure_after_consuming_the_identifier() {
    let fail = AtomicBool::new(true);
    let sink = FnSink(|_: &UniqueId, _: DayBucket| -> Result<(), SinkError> {
        if fail.swap(false, Ordering::SeqCst) {
            Err("disk full".into())
        } else {
            Ok(())
        }
    });
    let g = Generator::with_sink(ManualClock::new(NEW_YEAR_2024), NODE, sink);

    let err = g.generate().unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.to_string(), "failed to persist identifier: disk full");

    assert_eq!(g.generate().unwrap(), UniqueId::new(NEW_YEAR_2024, 1, NODE));
}

/// Passes the day of each identifier to the sink
#[test]
fn passes_the_day_of_each_identifier_to_the_sink() {
    let seen = StdMutex::new(Vec::new());
    let sink = FnSink(|id: &UniqueId, day: DayBucket| {
        seen.lock().unwrap().push((day.to_string(), *id));
        Ok::<_, SinkError>(())
    });
    // 2024-01-01T12:00:00Z
    let clock = ManualClock::new(NEW_YEAR_2024 + 12 * 3_600_000);
    let g = Generator::with_sink(&clock, NODE, sink);

    let id1 = g.generate().unwrap();
    let id2 = g.generate().unwrap();
    clock.advance(24 * 3_600_000);
    let id3 = g.generate().unwrap();
    assert_eq!(g.clock().unix_ts_ms(), NEW_YEAR_2024 + 36 * 3_600_000);
    drop(g);

    assert_eq!(
        seen.into_inner().unwrap(),
        [
            ("2024-01-01".to_owned(), id1),
            ("2024-01-01".to_owned(), id2),
            ("2024-01-02".to_owned(), id3),
        ]
    );
}
