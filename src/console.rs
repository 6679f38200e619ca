use std::io::{self, Write};

use owo_colors::{OwoColorize, Style};

use crate::sink::Sink;
use crate::{Level, Record, Result};

fn level_style(level: Level) -> Style {
    match level {
        Level::Trace | Level::Debug => Style::new().blue(),
        Level::Info => Style::new().green(),
        Level::Warn | Level::Error | Level::Fatal => Style::new().yellow(),
    }
}

fn time_style() -> Style {
    Style::new().cyan()
}

fn site_style() -> Style {
    Style::new().black().on_white()
}

/// Writes every record it receives to a terminal-like stream (stdout by
/// default), optionally with ANSI colors.
pub struct ConsoleSink {
    color: bool,
    out: Box<dyn Write + Send>,
}

impl ConsoleSink {
    /// A plain console sink writing to stdout.
    pub fn new() -> Self {
        Self {
            color: false,
            out: Box::new(io::stdout()),
        }
    }

    /// Enable or disable ANSI styling.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Redirect output to another stream.
    pub fn with_writer<W: Write + Send + 'static>(mut self, out: W) -> Self {
        self.out = Box::new(out);
        self
    }

    pub fn color(&self) -> bool {
        self.color
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, record: &Record) -> Result<()> {
        if self.color {
            let level = level_style(record.level);
            writeln!(
                self.out,
                "[{}][{}][{}] {}",
                record.level.style(level),
                record.timestamp.style(time_style()),
                record.site.style(site_style()),
                record.message.style(level),
            )?;
        } else {
            write!(self.out, "{}", record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_console_plain_matches_canonical_line() {
        let buf = Shared::default();
        let mut sink = ConsoleSink::new().with_writer(buf.clone());
        let record = Record::new(Level::Debug, "2026/01/01 00:00:00", "a.rs:1", "plain");
        sink.write(&record).unwrap();
        assert_eq!(buf.text(), record.to_string());
        assert!(!buf.text().contains('\x1b'));
    }

    #[test]
    fn test_console_color_keeps_field_order() {
        let buf = Shared::default();
        let mut sink = ConsoleSink::new().with_color(true).with_writer(buf.clone());
        sink.write(&Record::new(Level::Error, "T", "b.rs:2", "boom"))
            .unwrap();
        let out = buf.text();
        let level = "ERROR".style(level_style(Level::Error)).to_string();
        assert!(out.starts_with(&format!("[{}][", level)));
        assert!(out.contains('\x1b'));
        let (l, t, s, m) = (
            out.find("ERROR").unwrap(),
            out.find('T').unwrap(),
            out.find("b.rs:2").unwrap(),
            out.find("boom").unwrap(),
        );
        assert!(l < t && t < s && s < m);
        assert!(out.ends_with('\n'));
    }

    fn paint(level: Level) -> String {
        "x".style(level_style(level)).to_string()
    }

    #[test]
    fn test_console_color_bands() {
        assert_eq!(paint(Level::Trace), paint(Level::Debug));
        assert_ne!(paint(Level::Debug), paint(Level::Info));
        assert_eq!(paint(Level::Warn), paint(Level::Error));
        assert_eq!(paint(Level::Warn), paint(Level::Fatal));
        assert_ne!(paint(Level::Info), paint(Level::Warn));
        assert_ne!(paint(Level::Info), "x");
    }
}
