//! Sink capabilities.
//!
//! Every sink implements [`Sink`]. Sinks that buffer or rotate additionally
//! expose [`Flusher`] and [`Rotater`] through the `as_*` accessors; the
//! dispatcher checks them once, at registration.

use crate::{Record, Result};

/// A destination for log records.
///
/// After registration a sink is owned and driven by the dispatcher worker
/// alone, so implementations need no internal synchronization.
pub trait Sink: Send {
    /// Prepare the sink for writing. Failure here is a setup error.
    fn init(&mut self) -> Result<()>;

    /// Write one record.
    fn write(&mut self, record: &Record) -> Result<()>;

    /// Returns the flush capability, if the sink has one.
    fn as_flusher(&mut self) -> Option<&mut dyn Flusher> {
        None
    }

    /// Returns the rotate capability, if the sink has one.
    fn as_rotater(&mut self) -> Option<&mut dyn Rotater> {
        None
    }
}

/// Pushes buffered output to the underlying device.
pub trait Flusher {
    fn flush(&mut self) -> Result<()>;
}

/// Archives the active output when its rotation period has ended.
pub trait Rotater {
    fn rotate(&mut self) -> Result<()>;
}

/// A registered sink plus the capabilities detected at registration.
pub(crate) struct SinkSlot {
    sink: Box<dyn Sink>,
    flushes: bool,
    rotates: bool,
}

impl SinkSlot {
    pub(crate) fn new(mut sink: Box<dyn Sink>) -> Self {
        let flushes = sink.as_flusher().is_some();
        let rotates = sink.as_rotater().is_some();
        Self {
            sink,
            flushes,
            rotates,
        }
    }

    pub(crate) fn write(&mut self, record: &Record) -> Result<()> {
        self.sink.write(record)
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        if !self.flushes {
            return Ok(());
        }
        match self.sink.as_flusher() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }

    pub(crate) fn rotate(&mut self) -> Result<()> {
        if !self.rotates {
            return Ok(());
        }
        match self.sink.as_rotater() {
            Some(r) => r.rotate(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;

    struct Plain(usize);

    impl Sink for Plain {
        fn init(&mut self) -> Result<()> {
            Ok(())
        }

        fn write(&mut self, _record: &Record) -> Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Full {
        flushed: usize,
        rotated: usize,
    }

    impl Sink for Full {
        fn init(&mut self) -> Result<()> {
            Ok(())
        }

        fn write(&mut self, _record: &Record) -> Result<()> {
            Ok(())
        }

        fn as_flusher(&mut self) -> Option<&mut dyn Flusher> {
            Some(self)
        }

        fn as_rotater(&mut self) -> Option<&mut dyn Rotater> {
            Some(self)
        }
    }

    impl Flusher for Full {
        fn flush(&mut self) -> Result<()> {
            self.flushed += 1;
            Ok(())
        }
    }

    impl Rotater for Full {
        fn rotate(&mut self) -> Result<()> {
            self.rotated += 1;
            Ok(())
        }
    }

    #[test]
    fn test_slot_detects_capabilities() {
        let plain = SinkSlot::new(Box::new(Plain(0)));
        assert!(!plain.flushes);
        assert!(!plain.rotates);

        let full = SinkSlot::new(Box::new(Full::default()));
        assert!(full.flushes);
        assert!(full.rotates);
    }

    #[test]
    fn test_slot_without_capabilities_is_noop() {
        let mut slot = SinkSlot::new(Box::new(Plain(0)));
        slot.write(&Record::new(Level::Info, "t", "s", "m")).unwrap();
        slot.flush().unwrap();
        slot.rotate().unwrap();
    }
}
