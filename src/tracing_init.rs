//! Bridge from the `tracing` ecosystem into a [`Dispatcher`].
//!
//! [`DispatchLayer`] turns every `tracing` event into a record, so libraries
//! instrumented with `tracing` end up in the same files as direct calls.
//! Events emitted by this crate itself (target `spoollog` or `spoollog::*`)
//! are skipped: they report sink failures and must not loop back into the
//! pipeline.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::{Dispatcher, Error, Level, Result};

const OWN_TARGET: &str = "spoollog";

/// A `tracing_subscriber` layer that forwards events to a dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchLayer {
    dispatcher: Arc<Dispatcher>,
}

impl DispatchLayer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn map_level(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::TRACE => Level::Trace,
        tracing::Level::DEBUG => Level::Debug,
        tracing::Level::INFO => Level::Info,
        tracing::Level::WARN => Level::Warn,
        _ => Level::Error,
    }
}

/// Collects the `message` field followed by `key=value` pairs.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl<S: Subscriber> Layer<S> for DispatchLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if is_own_target(meta.target()) {
            return;
        }
        let level = map_level(meta.level());
        if !self.dispatcher.enabled(level) {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let file = meta.file().unwrap_or(meta.target());
        let base = file.rsplit(['/', '\\']).next().unwrap_or(file);
        let site = match meta.line() {
            Some(line) => format!("{}:{}", base, line),
            None => base.to_string(),
        };

        let _ = self.dispatcher.submit(
            level,
            format_args!("{}{}", visitor.message, visitor.fields),
            &site,
        );
    }
}

/// Install a global `tracing` subscriber that forwards into `dispatcher`.
///
/// `RUST_LOG` narrows what reaches the layer when set; otherwise every event
/// is offered and the dispatcher's own level floor decides.
pub fn init_tracing(dispatcher: Arc<Dispatcher>) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(spec) if !spec.is_empty() => {
            EnvFilter::try_new(&spec).map_err(|e| Error::Init(e.to_string()))?
        }
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(DispatchLayer::new(dispatcher))
        .try_init()
        .map_err(|e| Error::Init(e.to_string()))
}
