//! Persistence sinks that receive every generated identifier.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::SinkError;
use crate::UniqueId;

/// The UTC calendar day an identifier was generated on.
///
/// Displays as `YYYY-MM-DD`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct DayBucket(NaiveDate);

impl DayBucket {
    /// Returns the UTC day containing `unix_ts_ms`, or `None` if the timestamp is outside the
    /// range of representable calendar dates.
    pub fn from_unix_ts_ms(unix_ts_ms: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(unix_ts_ms).map(|dt| Self(dt.date_naive()))
    }

    /// Returns the UTC day of an identifier's timestamp.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uniqueid::{DayBucket, UniqueId};
    ///
    /// let id = UniqueId::from_fields(1_704_110_400_000, 0, b"abcdef")?;
    /// assert_eq!(DayBucket::of(&id).unwrap().to_string(), "2024-01-01");
    /// # Ok::<(), uniqueid::Error>(())
    /// ```
    pub fn of(id: &UniqueId) -> Option<Self> {
        Self::from_unix_ts_ms(id.timestamp())
    }

    /// Returns the calendar date.
    pub const fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DayBucket {
    fn from(src: NaiveDate) -> Self {
        Self(src)
    }
}

impl fmt::Display for DayBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Receives each identifier a [`Generator`](crate::Generator) produces, together with its day.
///
/// A generator calls the sink while holding its lock, so calls arrive one at a time and in
/// generation order. Any error returned is surfaced to the caller of
/// [`Generator::generate`](crate::Generator::generate) as
/// [`Error::PersistenceFailure`](crate::Error::PersistenceFailure).
///
/// Closures become sinks through [`FnSink`]:
///
/// ```rust
/// use std::sync::Mutex;
/// use uniqueid::{DayBucket, FnSink, Generator, ManualClock, NodeId, SinkError, UniqueId};
///
/// let seen = Mutex::new(Vec::new());
/// let sink = FnSink(|id: &UniqueId, day: DayBucket| {
///     seen.lock().unwrap().push((day.to_string(), *id));
///     Ok::<_, SinkError>(())
/// });
/// let g = Generator::with_sink(ManualClock::new(0), NodeId::new(*b"abcdef"), sink);
/// let id = g.generate()?;
/// drop(g);
/// assert_eq!(seen.into_inner().unwrap(), [("1970-01-01".to_owned(), id)]);
/// # Ok::<(), uniqueid::Error>(())
/// ```
pub trait Sink {
    /// Records one identifier under the day it belongs to.
    fn persist(&self, id: &UniqueId, day: DayBucket) -> Result<(), SinkError>;
}

/// A sink that discards everything.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct NoopSink;

impl Sink for NoopSink {
    fn persist(&self, _: &UniqueId, _: DayBucket) -> Result<(), SinkError> {
        Ok(())
    }
}

/// An adapter that implements [`Sink`] for closures.
#[derive(Clone, Debug, Default)]
pub struct FnSink<F>(/** The wrapped closure. */ pub F);

impl<F> Sink for FnSink<F>
where
    F: Fn(&UniqueId, DayBucket) -> Result<(), SinkError>,
{
    fn persist(&self, id: &UniqueId, day: DayBucket) -> Result<(), SinkError> {
        (self.0)(id, day)
    }
}

impl<S: Sink + ?Sized> Sink for &S {
    fn persist(&self, id: &UniqueId, day: DayBucket) -> Result<(), SinkError> {
        (**self).persist(id, day)
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn persist(&self, id: &UniqueId, day: DayBucket) -> Result<(), SinkError> {
        (**self).persist(id, day)
    }
}

/// An append-only text log with one file per UTC day.
///
/// Each identifier is written as its canonical string followed by a newline to
/// `<dir>/<YYYY-MM-DD>.log`. Files and the directory are created on demand. Each line goes out in
/// a single append, so generators sharing a directory never interleave partial lines.
#[derive(Clone, Debug)]
pub struct DailyLogSink {
    dir: PathBuf,
}

impl DailyLogSink {
    /// Creates a sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory holding the daily files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the file for `day`.
    pub fn path_for(&self, day: DayBucket) -> PathBuf {
        self.dir.join(format!("{day}.log"))
    }

    /// Reads back the identifiers recorded for `day`, in append order.
    ///
    /// A day without a file yields an empty list.
    pub fn read(&self, day: DayBucket) -> crate::Result<Vec<UniqueId>, SinkError> {
        let text = match fs::read_to_string(self.path_for(day)) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        text.lines()
            .map(|line| line.parse::<UniqueId>().map_err(SinkError::from))
            .collect()
    }
}

impl Sink for DailyLogSink {
    fn persist(&self, id: &UniqueId, day: DayBucket) -> Result<(), SinkError> {
        let path = self.path_for(day);
        if !path.exists() {
            fs::create_dir_all(&self.dir)?;
            tracing::debug!(path = %path.display(), "opening new daily log");
        }
        let mut line = [b'\n'; 37];
        line[..36].copy_from_slice(id.encode().as_bytes());
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(&line)?;
        Ok(())
    }
}
