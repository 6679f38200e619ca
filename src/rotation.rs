//! Rotation pattern compiler.
//!
//! A rotation pattern is a path template such as `logs/app.log.%Y%M%D%H`.
//! Compiling it yields the list of time fields to watch and a formatter that
//! renders the archive path for a given set of field values.

use std::fmt::Write as _;
use std::path::PathBuf;

use time::OffsetDateTime;

use crate::{Error, Result};

/// A time component that can appear in a rotation pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    /// `%Y`
    Year,
    /// `%M`
    Month,
    /// `%D`
    Day,
    /// `%H`
    Hour,
    /// `%m`
    Minute,
}

impl TimeField {
    fn from_placeholder(c: char) -> Option<Self> {
        match c {
            'Y' => Some(Self::Year),
            'M' => Some(Self::Month),
            'D' => Some(Self::Day),
            'H' => Some(Self::Hour),
            'm' => Some(Self::Minute),
            _ => None,
        }
    }

    /// Extract this field's value from `now`.
    pub fn extract(&self, now: &OffsetDateTime) -> i32 {
        match self {
            Self::Year => now.year(),
            Self::Month => u8::from(now.month()) as i32,
            Self::Day => now.day() as i32,
            Self::Hour => now.hour() as i32,
            Self::Minute => now.minute() as i32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(TimeField),
}

/// A compiled rotation pattern together with the last observed field values.
#[derive(Debug, Clone)]
pub struct RotationPattern {
    template: String,
    segments: Vec<Segment>,
    fields: Vec<TimeField>,
    last: Vec<i32>,
}

impl RotationPattern {
    /// Compile `template`, seeding the observed values from the current time.
    ///
    /// Returns `Ok(None)` for an empty template or one without any `%`: such
    /// a path is static and never rotates.
    pub fn compile(template: &str) -> Result<Option<Self>> {
        Self::compile_at(template, now())
    }

    /// Compile `template`, seeding the observed values from `now`.
    pub fn compile_at(template: &str, now: OffsetDateTime) -> Result<Option<Self>> {
        if !template.contains('%') {
            return Ok(None);
        }

        let mut segments = Vec::new();
        let mut fields = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            let field = match chars.next() {
                Some(p) => TimeField::from_placeholder(p).ok_or_else(|| Error::Pattern {
                    template: template.to_string(),
                    reason: format!("unknown placeholder %{}", p),
                })?,
                None => {
                    return Err(Error::Pattern {
                        template: template.to_string(),
                        reason: "dangling % at end of template".to_string(),
                    });
                }
            };
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Field(field));
            fields.push(field);
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let last = fields.iter().map(|f| f.extract(&now)).collect();
        Ok(Some(Self {
            template: template.to_string(),
            segments,
            fields,
            last,
        }))
    }

    /// The original template text.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Fields in the order their placeholders appear.
    pub fn fields(&self) -> &[TimeField] {
        &self.fields
    }

    /// Values observed at the last compile or check.
    pub fn last_observed(&self) -> &[i32] {
        &self.last
    }

    /// Render the template with `values`, one per field in order.
    pub fn format(&self, values: &[i32]) -> PathBuf {
        let mut out = String::with_capacity(self.template.len() + 8);
        let mut values = values.iter();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Field(field) => {
                    let v = values.next().copied().unwrap_or_default();
                    let _ = match field {
                        TimeField::Year => write!(out, "{}", v),
                        _ => write!(out, "{:02}", v),
                    };
                }
            }
        }
        PathBuf::from(out)
    }

    /// Re-evaluate every field against `now`.
    ///
    /// When any value differs from the cached one, the cache is replaced and
    /// the archive path for the *previous* values is returned. Otherwise
    /// returns `None`.
    pub fn advance(&mut self, now: &OffsetDateTime) -> Option<PathBuf> {
        let current: Vec<i32> = self.fields.iter().map(|f| f.extract(now)).collect();
        if current == self.last {
            return None;
        }
        let previous = std::mem::replace(&mut self.last, current);
        Some(self.format(&previous))
    }
}

/// Local wall-clock time, falling back to UTC when the offset is unavailable.
pub(crate) fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
