use std::fmt;

use crossbeam_queue::ArrayQueue;

use crate::Level;

/// One log event as it travels from a producer to the sinks.
///
/// Records move by value through the dispatcher queue, so once submitted a
/// producer can no longer observe or mutate them. The worker returns them to
/// the [`RecordPool`] after every sink has seen them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Pre-formatted wall-clock time, second granularity.
    pub timestamp: String,
    pub level: Level,
    /// `file:line` of the log call.
    pub site: String,
    pub message: String,
}

impl Record {
    /// Create a record from its parts.
    pub fn new(
        level: Level,
        timestamp: impl Into<String>,
        site: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            level,
            site: site.into(),
            message: message.into(),
        }
    }

    /// Reset the text fields, keeping their allocations.
    fn clear(&mut self) {
        self.timestamp.clear();
        self.site.clear();
        self.message.clear();
        self.level = Level::default();
    }
}

/// Canonical line: `[LEVEL][timestamp][file:line] message\n`.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[{}][{}][{}] {}",
            self.level, self.timestamp, self.site, self.message
        )
    }
}

/// Lock-free pool of reusable records shared by producers and the worker.
///
/// `checkout` pops an idle record or allocates a new one when the pool is
/// empty. `recycle` clears a consumed record and pushes it back, dropping it
/// when the pool is full.
pub struct RecordPool {
    queue: ArrayQueue<Record>,
}

impl RecordPool {
    /// Create a pool that keeps at most `capacity` idle records (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity.max(1)),
        }
    }

    /// Take an idle record, or allocate a fresh one when the pool is empty.
    #[inline]
    pub fn checkout(&self) -> Record {
        self.queue.pop().unwrap_or_default()
    }

    /// Hand a consumed record back. Records beyond capacity are dropped.
    #[inline]
    pub fn recycle(&self, mut record: Record) {
        record.clear();
        let _ = self.queue.push(record);
    }

    /// Number of idle records currently held.
    pub fn idle(&self) -> usize {
        self.queue.len()
    }

    /// Maximum number of idle records kept.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

impl fmt::Debug for RecordPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordPool")
            .field("idle", &self.idle())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_line_format() {
        let record = Record::new(Level::Info, "2026/01/02 03:04:05", "main.rs:12", "hello");
        assert_eq!(
            record.to_string(),
            "[INFO][2026/01/02 03:04:05][main.rs:12] hello\n"
        );
    }

    #[test]
    fn test_pool_reuses_allocations() {
        let pool = RecordPool::new(4);
        let mut record = pool.checkout();
        record.message.push_str("a fairly long message that allocates");
        let cap = record.message.capacity();
        pool.recycle(record);
        assert_eq!(pool.idle(), 1);

        let again = pool.checkout();
        assert!(again.message.is_empty());
        assert!(again.timestamp.is_empty());
        assert_eq!(again.message.capacity(), cap);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_pool_respects_capacity() {
        let pool = RecordPool::new(2);
        for _ in 0..5 {
            pool.recycle(Record::default());
        }
        assert_eq!(pool.idle(), 2);
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn test_pool_empty_allocates_and_zero_capacity_keeps_one() {
        let pool = RecordPool::new(0);
        assert_eq!(pool.capacity(), 1);
        let record = pool.checkout();
        assert_eq!(record, Record::default());
        pool.recycle(record);
        pool.recycle(Record::default());
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_recycled_record_is_cleared() {
        let pool = RecordPool::new(1);
        pool.recycle(Record::new(Level::Fatal, "ts", "a.rs:1", "msg"));
        assert_eq!(pool.checkout(), Record::default());
    }

    #[test]
    fn test_pool_concurrent_use() {
        let pool = std::sync::Arc::new(RecordPool::new(64));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let mut r = pool.checkout();
                        r.message.push_str(&i.to_string());
                        pool.recycle(r);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(pool.idle() <= 4);
        assert_eq!(pool.capacity(), 64);
    }
}
