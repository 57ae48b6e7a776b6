//! Time-ordered 128-bit unique identifiers stamped with a node identifier
//!
//! ```rust
//! use uniqueid::{Generator, NodeId};
//!
//! let g = Generator::system(NodeId::new(*b"node-1"));
//! let id = g.generate()?;
//! println!("{}", id); // e.g. "0000018c-c251-f400-0001-6e6f64652d31"
//! println!("{:?}", id.as_bytes()); // as 16-byte big-endian array
//! # Ok::<(), uniqueid::Error>(())
//! ```
//!
//! # Field and bit layout
//!
//! This implementation produces identifiers with the following bit layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          unix_ts_ms                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          unix_ts_ms                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           sequence            |            node_id            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            node_id                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - The 64-bit `unix_ts_ms` field is a signed big-endian count of milliseconds since the Unix
//!   epoch.
//! - The 16-bit `sequence` field is a signed big-endian counter that starts at zero in every
//!   millisecond and increments for each further identifier generated within it.
//! - The 48-bit `node_id` field holds the six bytes identifying the generator instance.
//!
//! Identifiers compare as unsigned byte strings, so for non-negative timestamps and sequences they
//! sort by creation time, then sequence, then node. The canonical string form is the familiar
//! 8-4-4-4-12 lowercase hexadecimal layout, which sorts the same way.
//!
//! A [`Generator`] fails the call rather than bending time: when the clock moves backwards it
//! returns [`Error::ClockRegression`], and when more than 32,766 identifiers are requested within
//! one millisecond it returns [`Error::SequenceExhausted`]. In both cases its state is unchanged
//! and the caller decides whether to retry.
//!
//! # Persistence
//!
//! Every generated identifier is handed to a [`Sink`] together with its UTC [`DayBucket`].
//! [`DailyLogSink`] appends canonical strings to one file per day:
//!
//! ```rust
//! use uniqueid::{DailyLogSink, Generator, NodeId, SystemClock};
//!
//! let dir = std::env::temp_dir().join("uniqueid-doc");
//! let g = Generator::with_sink(SystemClock, NodeId::new(*b"node-1"), DailyLogSink::new(&dir));
//! println!("{}", g.generate()?);
//! # Ok::<(), uniqueid::Error>(())
//! ```

mod error;
pub use error::{Error, Result, SinkError};

mod id;
pub use id::{NodeId, UniqueId};

pub mod generator;
#[doc(inline)]
pub use generator::Generator;

pub mod sink;
#[doc(inline)]
pub use sink::{DailyLogSink, DayBucket, FnSink, NoopSink, Sink};

pub mod time;
#[doc(inline)]
pub use time::{ManualClock, SystemClock, TimeSource};
