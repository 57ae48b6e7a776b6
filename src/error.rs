//! Error types shared by identifier construction, parsing, and generation.

/// A boxed error returned by a [`Sink`](crate::Sink) that failed to record an identifier.
pub type SinkError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that this crate can produce.
///
/// None of them are retried internally. Use [`Error::is_transient`] to tell a condition that may
/// clear up on a later call from one that points at misconfiguration or bad input.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A node identifier was not exactly [`NodeId::LEN`](crate::NodeId::LEN) bytes long.
    #[error("node identifier must be exactly 6 bytes, got {len}")]
    InvalidLength {
        /// The length of the rejected byte string.
        len: usize,
    },

    /// A string was not the 8-4-4-4-12 hexadecimal representation of an identifier.
    #[error("invalid string representation")]
    InvalidFormat,

    /// The clock reported a time earlier than the one used for the previous identifier.
    #[error("clock moved backwards from {last} ms to {now} ms")]
    ClockRegression {
        /// Timestamp of the last identifier produced.
        last: i64,
        /// Timestamp reported by the clock for the failing call.
        now: i64,
    },

    /// Every sequence number of the current millisecond has been handed out.
    #[error("sequence exhausted for millisecond {timestamp}")]
    SequenceExhausted {
        /// The saturated millisecond.
        timestamp: i64,
    },

    /// The sink could not record a generated identifier.
    #[error("failed to persist identifier: {0}")]
    PersistenceFailure(#[source] SinkError),
}

impl Error {
    /// Returns `true` if the same call may succeed later without any change of configuration.
    ///
    /// `SequenceExhausted` clears up when the millisecond rolls over, and a `PersistenceFailure`
    /// may be caused by a temporary storage condition. The other kinds indicate bad input or a
    /// misbehaving clock.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::SequenceExhausted { .. } | Self::PersistenceFailure(_)
        )
    }
}
