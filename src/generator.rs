//! Identifier generator and related types.

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::sink::{DayBucket, NoopSink, Sink};
use crate::time::{SystemClock, TimeSource};
use crate::{NodeId, UniqueId};

#[cfg(test)]
mod tests;

/// The first sequence value that is never handed out; usable values are `0..MAX_SEQUENCE`.
pub const MAX_SEQUENCE: i16 = i16::MAX - 1;

/// Represents an identifier generator that stamps every identifier with its node identifier and
/// guarantees the monotonic order of identifiers generated within the same millisecond.
///
/// The generator is meant to be shared: [`generate`](Self::generate) takes `&self` and serializes
/// callers on an internal lock. The following example generates identifiers from several threads
/// at once.
///
/// # Examples
///
/// ```rust
/// use std::thread;
/// use uniqueid::{Generator, NodeId};
///
/// let g = Generator::system(NodeId::new(*b"node-1"));
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = &g;
///         s.spawn(move || {
///             for _ in 0..8 {
///                 println!("{} by thread {}", g.generate().unwrap(), i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// ```
///
/// # Clock rollback and counter exhaustion
///
/// The generator never reuses or adjusts timestamps. Each call compares the clock with the
/// timestamp of the previous identifier:
///
/// | Observed time          | Outcome                                    |
/// | ---------------------- | ------------------------------------------ |
/// | Later than last call   | Sequence restarts at zero                  |
/// | Same as last call      | Sequence increments, or fails when full    |
/// | Earlier than last call | Fails with [`Error::ClockRegression`]      |
///
/// A failed call leaves the generator state untouched, so a later call succeeds once the clock
/// catches up or the millisecond rolls over.
#[derive(Debug)]
pub struct Generator<C = SystemClock, S = NoopSink> {
    state: Mutex<State>,
    clock: C,
    node_id: NodeId,
    sink: S,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
struct State {
    /// `None` until the first identifier is produced.
    timestamp: Option<i64>,
    sequence: i16,
}

impl State {
    /// Returns the state after producing an identifier at `unix_ts_ms`, without committing it.
    fn advance(self, unix_ts_ms: i64) -> Result<Self> {
        match self.timestamp {
            Some(last) if unix_ts_ms < last => Err(Error::ClockRegression {
                last,
                now: unix_ts_ms,
            }),
            Some(last) if unix_ts_ms == last => {
                let sequence = self.sequence + 1;
                if sequence >= MAX_SEQUENCE {
                    return Err(Error::SequenceExhausted {
                        timestamp: unix_ts_ms,
                    });
                }
                Ok(Self { sequence, ..self })
            }
            _ => Ok(Self {
                timestamp: Some(unix_ts_ms),
                sequence: 0,
            }),
        }
    }
}

impl Generator {
    /// Creates a generator on the system clock with the given node identifier.
    pub fn system(node_id: NodeId) -> Self {
        Self::new(SystemClock, node_id)
    }

    /// Creates a generator on the system clock with a random node identifier.
    ///
    /// Two generators created this way collide only if they draw the same 48 random bits.
    pub fn random() -> Self {
        Self::system(NodeId::random())
    }
}

impl<C: TimeSource> Generator<C> {
    /// Creates a generator instance that does not persist what it generates.
    pub fn new(clock: C, node_id: NodeId) -> Self {
        Self::with_sink(clock, node_id, NoopSink)
    }
}

impl<C: TimeSource, S: Sink> Generator<C, S> {
    /// Creates a generator instance that hands every identifier to `sink`.
    pub fn with_sink(clock: C, node_id: NodeId, sink: S) -> Self {
        Self {
            state: Mutex::new(State::default()),
            clock,
            node_id,
            sink,
        }
    }

    /// Generates a new identifier from the current time.
    ///
    /// The clock query, the state update, and the sink call all happen under the generator's lock,
    /// so the sink observes identifiers in generation order.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock reports a time earlier than the previous call.
    /// - [`Error::SequenceExhausted`] if [`MAX_SEQUENCE`] identifiers were already generated in
    ///   the current millisecond.
    /// - [`Error::PersistenceFailure`] if the sink fails. The identifier is consumed in that case;
    ///   the next call will not reproduce it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uniqueid::{Generator, ManualClock, NodeId};
    ///
    /// let g = Generator::new(ManualClock::new(1_704_067_200_000), NodeId::new(*b"abcdef"));
    /// assert_eq!(g.generate()?.to_string(), "0000018c-c251-f400-0000-616263646566");
    /// assert_eq!(g.generate()?.to_string(), "0000018c-c251-f400-0001-616263646566");
    /// # Ok::<(), uniqueid::Error>(())
    /// ```
    pub fn generate(&self) -> Result<UniqueId> {
        let mut state = self.state.lock();
        let unix_ts_ms = self.clock.unix_ts_ms();

        let next = state.advance(unix_ts_ms).inspect_err(|e| {
            tracing::warn!(error = %e, node_id = ?self.node_id, "refusing to generate identifier");
        })?;
        *state = next;

        let id = UniqueId::new(unix_ts_ms, next.sequence, self.node_id);
        tracing::trace!(%id, "generated identifier");

        let day = DayBucket::of(&id).ok_or_else(|| {
            Error::PersistenceFailure(format!("timestamp {unix_ts_ms} has no calendar day").into())
        })?;
        self.sink.persist(&id, day).map_err(|e| {
            tracing::error!(%id, error = %e, "sink failed to persist identifier");
            Error::PersistenceFailure(e)
        })?;
        Ok(id)
    }

    /// Returns the node identifier embedded in every generated identifier.
    pub const fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Returns a reference to the clock.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns a reference to the sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }
}
