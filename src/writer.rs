use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use time::OffsetDateTime;

use crate::rotation::{self, RotationPattern};
use crate::sink::{Flusher, Rotater, Sink};
use crate::{Error, Level, Record, Result};

const BUFFER_SIZE: usize = 8 * 1024;

/// A buffered file sink that accepts an inclusive band of levels and archives
/// its file whenever a watched time field of its rotation pattern changes.
pub struct FileSink {
    /// Lowest accepted level.
    floor: Level,
    /// Highest accepted level.
    ceil: Level,
    /// Static path of the active log file.
    path: PathBuf,
    /// Archive naming; `None` means the file never rotates.
    pattern: Option<RotationPattern>,
    /// Buffered handle to the active file, present between `init` and close.
    out: Option<BufWriter<File>>,
}

impl FileSink {
    /// Create a sink for `path` accepting every level, without rotation.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            floor: Level::Trace,
            ceil: Level::Fatal,
            path: path.into(),
            pattern: None,
            out: None,
        }
    }

    /// Restrict the sink to records within `[floor, ceil]`.
    pub fn with_band(mut self, floor: Level, ceil: Level) -> Self {
        self.floor = floor;
        self.ceil = ceil;
        self
    }

    /// Set the rotation template. A template without placeholders disables
    /// rotation.
    pub fn with_pattern(mut self, template: &str) -> Result<Self> {
        self.pattern = RotationPattern::compile(template)?;
        Ok(self)
    }

    /// Use an already compiled pattern.
    pub fn with_compiled_pattern(mut self, pattern: Option<RotationPattern>) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn band(&self) -> (Level, Level) {
        (self.floor, self.ceil)
    }

    pub fn pattern(&self) -> Option<&RotationPattern> {
        self.pattern.as_ref()
    }

    /// Whether `level` falls inside this sink's band.
    pub fn accepts(&self, level: Level) -> bool {
        level >= self.floor && level <= self.ceil
    }

    /// Open (or reopen) the active file at the static path.
    fn open(&mut self) -> Result<()> {
        // Ensure parent directory exists (create if necessary).
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.out = Some(BufWriter::with_capacity(BUFFER_SIZE, file));
        Ok(())
    }

    /// Rotate as if the current time were `now`.
    ///
    /// At most one archive is produced per call. The observed field values
    /// are updated before any file operation, so a failed rename is not
    /// retried on the next tick.
    pub fn rotate_at(&mut self, now: OffsetDateTime) -> Result<()> {
        let Some(archive) = self.pattern.as_mut().and_then(|p| p.advance(&now)) else {
            return Ok(());
        };

        if let Some(out) = self.out.as_mut() {
            out.flush()?;
        }
        if self.out.is_some() {
            std::fs::rename(&self.path, &archive)?;
            // Close the archived handle.
            self.out = None;
        }
        self.open()
    }

    /// Flush and release the file handle.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut out) = self.out.take() {
            out.flush()?;
        }
        Ok(())
    }
}

impl Sink for FileSink {
    fn init(&mut self) -> Result<()> {
        self.open()
    }

    fn write(&mut self, record: &Record) -> Result<()> {
        if !self.accepts(record.level) {
            return Ok(());
        }
        let out = self
            .out
            .as_mut()
            .ok_or_else(|| Error::NotOpen(self.path.clone()))?;
        write!(out, "{}", record)?;
        Ok(())
    }

    fn as_flusher(&mut self) -> Option<&mut dyn Flusher> {
        Some(self)
    }

    fn as_rotater(&mut self) -> Option<&mut dyn Rotater> {
        Some(self)
    }
}

impl Flusher for FileSink {
    fn flush(&mut self) -> Result<()> {
        if let Some(out) = self.out.as_mut() {
            out.flush()?;
        }
        Ok(())
    }
}

impl Rotater for FileSink {
    fn rotate(&mut self) -> Result<()> {
        self.rotate_at(rotation::now())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
