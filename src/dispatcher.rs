//! The dispatcher: a bounded queue of records drained by one worker thread.
//!
//! ```text
//! [producers] -> level check -> pooled Record -> bounded queue -> [worker] -> sinks
//!                                                                   ^   ^
//!                                                         flush tick   rotate tick
//! ```
//!
//! The worker is the only thread that touches sinks. Records, registrations,
//! flush barriers and the shutdown request all travel through the same FIFO
//! queue, which gives the pipeline its ordering guarantees.

use std::fmt::{self, Write as _};
use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded, select, tick};
use time::format_description::OwnedFormatItem;

use crate::record::RecordPool;
use crate::rotation;
use crate::sink::{Sink, SinkSlot};
use crate::{Error, Level, Record, Result};

/// Default time layout, e.g. `2026/01/02 15:04:05`.
pub const DEFAULT_TIME_LAYOUT: &str = "[year]/[month]/[day] [hour]:[minute]:[second]";

/// Tunables for a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherOptions {
    /// Queue capacity; producers block once this many messages are pending.
    pub capacity: usize,
    /// Maximum number of idle records kept for reuse.
    pub pool_capacity: usize,
    /// Period of flush ticks.
    pub flush_interval: Duration,
    /// Period of rotate ticks.
    pub rotate_interval: Duration,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            capacity: 1024,
            pool_capacity: 1024,
            flush_interval: Duration::from_millis(500),
            rotate_interval: Duration::from_secs(10),
        }
    }
}

enum Message {
    Record(Record),
    Register(SinkSlot),
    Flush(Sender<()>),
    Shutdown,
}

/// Formatted-time cache keyed by whole seconds.
struct TimeCache {
    layout: OwnedFormatItem,
    epoch: i64,
    formatted: String,
}

impl TimeCache {
    fn fill(&mut self, out: &mut String) {
        let now = rotation::now();
        let epoch = now.unix_timestamp();
        if epoch != self.epoch || self.formatted.is_empty() {
            match now.format(&self.layout) {
                Ok(s) => self.formatted = s,
                Err(e) => {
                    tracing::warn!(
                        target: "spoollog::dispatcher",
                        error = %e,
                        "time format failed"
                    );
                    self.formatted.clear();
                }
            }
            self.epoch = epoch;
        }
        out.push_str(&self.formatted);
    }
}

/// Handle to a running logging pipeline.
///
/// Producers on any thread call [`submit`](Self::submit) (or the per-level
/// helpers). Dropping the handle shuts the pipeline down.
pub struct Dispatcher {
    tx: Sender<Message>,
    level: AtomicU8,
    closed: AtomicBool,
    pool: Arc<RecordPool>,
    clock: Mutex<TimeCache>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Start a dispatcher with default options and no sinks.
    pub fn new() -> Result<Self> {
        Self::with_options(DispatcherOptions::default())
    }

    /// Start a dispatcher with custom options and no sinks.
    pub fn with_options(options: DispatcherOptions) -> Result<Self> {
        let (tx, rx) = bounded(options.capacity.max(1));
        let pool = Arc::new(RecordPool::new(options.pool_capacity));
        let layout = time::format_description::parse_owned::<2>(DEFAULT_TIME_LAYOUT)
            .map_err(|e| Error::Config(e.to_string()))?;

        let worker = Worker {
            pool: pool.clone(),
            sinks: Vec::new(),
            options,
        };
        let handle = std::thread::Builder::new()
            .name("spoollog-worker".to_string())
            .spawn(move || worker.run(rx))
            .map_err(|e| Error::Init(e.to_string()))?;

        Ok(Self {
            tx,
            level: AtomicU8::new(Level::default() as u8),
            closed: AtomicBool::new(false),
            pool,
            clock: Mutex::new(TimeCache {
                layout,
                epoch: i64::MIN,
                formatted: String::new(),
            }),
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Current level floor.
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Records below `level` are discarded before reaching the queue.
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// Whether a record at `level` would be queued.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// Replace the timestamp layout (a `time` format description such as
    /// `[year]-[month]-[day] [hour]:[minute]:[second]`).
    pub fn set_time_layout(&self, layout: &str) -> Result<()> {
        let layout = time::format_description::parse_owned::<2>(layout)
            .map_err(|e| Error::Config(format!("invalid time layout {:?}: {}", layout, e)))?;
        let mut clock = self.clock.lock().map_err(|_| Error::Closed)?;
        clock.layout = layout;
        clock.formatted.clear();
        Ok(())
    }

    /// Initialize `sink` and append it to the sink list.
    ///
    /// Registration is a setup-phase operation: an `init` failure is returned
    /// to the caller and the sink is not added.
    pub fn register<S: Sink + 'static>(&self, sink: S) -> Result<()> {
        let mut sink: Box<dyn Sink> = Box::new(sink);
        sink.init()?;
        self.attach(sink)
    }

    /// Append an already initialized sink.
    pub(crate) fn attach(&self, sink: Box<dyn Sink>) -> Result<()> {
        self.send(Message::Register(SinkSlot::new(sink)))
    }

    /// Queue a record. Blocks while the queue is full.
    ///
    /// Returns `Ok(())` without doing any work when `level` is below the floor,
    /// and `Err(Error::Closed)` once the dispatcher has been shut down.
    pub fn submit(&self, level: Level, args: fmt::Arguments<'_>, site: &str) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }

        let mut record = self.pool.checkout();
        if let Ok(mut clock) = self.clock.lock() {
            clock.fill(&mut record.timestamp);
        }
        record.level = level;
        record.site.push_str(site);
        let _ = record.message.write_fmt(args);

        self.send(Message::Record(record))
    }

    /// Queue a record tagged with the caller's `file:line`.
    #[track_caller]
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        let site = site_tag(Location::caller());
        self.submit(level, args, &site)
    }

    #[track_caller]
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        let _ = self.log(Level::Trace, args);
    }

    #[track_caller]
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        let _ = self.log(Level::Debug, args);
    }

    #[track_caller]
    pub fn info(&self, args: fmt::Arguments<'_>) {
        let _ = self.log(Level::Info, args);
    }

    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        let _ = self.log(Level::Warn, args);
    }

    #[track_caller]
    pub fn error(&self, args: fmt::Arguments<'_>) {
        let _ = self.log(Level::Error, args);
    }

    #[track_caller]
    pub fn fatal(&self, args: fmt::Arguments<'_>) {
        let _ = self.log(Level::Fatal, args);
    }

    /// Block until every record queued before this call has been written and
    /// every sink flushed.
    pub fn flush(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        let (ack_tx, ack_rx) = bounded(1);
        self.send(Message::Flush(ack_tx))?;
        ack_rx.recv().map_err(|_| Error::Closed)
    }

    /// Stop accepting records, drain the queue, flush every sink and join the
    /// worker. Calling it again is a no-op.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.tx.send(Message::Shutdown);

        let handle = self.worker.lock().ok().and_then(|mut w| w.take());
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            tracing::error!(target: "spoollog::dispatcher", "log worker panicked");
        }
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn send(&self, message: Message) -> Result<()> {
        self.tx.send(message).map_err(|_| Error::Closed)
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("level", &self.level())
            .field("closed", &self.is_closed())
            .field("queued", &self.tx.len())
            .finish()
    }
}

/// `file:line` with the file reduced to its base name.
pub(crate) fn site_tag(location: &Location<'_>) -> String {
    let file = location.file();
    let base = file.rsplit(['/', '\\']).next().unwrap_or(file);
    format!("{}:{}", base, location.line())
}

struct Worker {
    pool: Arc<RecordPool>,
    sinks: Vec<SinkSlot>,
    options: DispatcherOptions,
}

impl Worker {
    fn run(mut self, rx: Receiver<Message>) {
        let flush_ticker = tick(self.options.flush_interval);
        let rotate_ticker = tick(self.options.rotate_interval);

        loop {
            select! {
                recv(rx) -> msg => match msg {
                    Ok(Message::Record(record)) => self.write(record),
                    Ok(Message::Register(slot)) => self.sinks.push(slot),
                    Ok(Message::Flush(ack)) => {
                        self.flush_all();
                        let _ = ack.send(());
                    }
                    Ok(Message::Shutdown) | Err(_) => break,
                },
                recv(flush_ticker) -> _ => self.flush_all(),
                recv(rotate_ticker) -> _ => self.rotate_all(),
            }
        }

        self.drain_late(&rx);
        self.flush_all();
        tracing::debug!(target: "spoollog::worker", sinks = self.sinks.len(), "log worker stopped");
    }

    /// Handle messages that a racing producer queued behind the shutdown
    /// marker. Once `rx` is dropped further sends fail with `Closed`.
    fn drain_late(&mut self, rx: &Receiver<Message>) {
        let mut late = 0usize;
        while let Ok(msg) = rx.try_recv() {
            match msg {
                Message::Record(record) => {
                    late += 1;
                    self.write(record);
                }
                Message::Register(slot) => self.sinks.push(slot),
                Message::Flush(ack) => {
                    self.flush_all();
                    let _ = ack.send(());
                }
                Message::Shutdown => {}
            }
        }
        if late > 0 {
            tracing::warn!(
                target: "spoollog::worker",
                records = late,
                "records submitted during shutdown"
            );
        }
    }

    fn write(&mut self, record: Record) {
        for (i, sink) in self.sinks.iter_mut().enumerate() {
            if let Err(e) = sink.write(&record) {
                tracing::warn!(
                    target: "spoollog::worker",
                    sink = i,
                    error = %e,
                    "sink write failed"
                );
            }
        }
        self.pool.recycle(record);
    }

    fn flush_all(&mut self) {
        for (i, sink) in self.sinks.iter_mut().enumerate() {
            if let Err(e) = sink.flush() {
                tracing::warn!(
                    target: "spoollog::worker",
                    sink = i,
                    error = %e,
                    "sink flush failed"
                );
            }
        }
    }

    fn rotate_all(&mut self) {
        for (i, sink) in self.sinks.iter_mut().enumerate() {
            if let Err(e) = sink.rotate() {
                tracing::warn!(
                    target: "spoollog::worker",
                    sink = i,
                    error = %e,
                    "sink rotate failed"
                );
            }
        }
    }
}
