use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// One event recorded by a [`CaptureLayer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedEvent {
    /// `TRACE`, `DEBUG`, `INFO`, `WARN` or `ERROR`.
    pub level: String,
    /// Module path of the call site, e.g. `ragbot_rag::pipeline`.
    pub target: String,
    /// The event's message, empty if it had none.
    pub message: String,
    /// Structured fields other than the message.
    pub fields: HashMap<String, Value>,
}

impl CapturedEvent {
    /// A field rendered as text, whatever its recorded type.
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Shared, cloneable storage for captured events.
///
/// ```rust,ignore
/// let events = CapturedEvents::new();
/// let subscriber = tracing_subscriber::registry().with(events.layer());
/// let _guard = tracing::subscriber::set_default(subscriber);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CapturedEvents {
    events: Arc<RwLock<Vec<CapturedEvent>>>,
}

impl CapturedEvents {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// A layer that appends every event it sees to this storage.
    pub fn layer(&self) -> CaptureLayer {
        CaptureLayer { events: Arc::clone(&self.events) }
    }

    /// Snapshot of everything captured so far, in order.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.read().map(|events| events.clone()).unwrap_or_default()
    }

    /// First captured event with the given message.
    pub fn find(&self, message: &str) -> Option<CapturedEvent> {
        self.events().into_iter().find(|e| e.message == message)
    }

    /// Drop every captured event. Clones see the cleared storage too.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }
}

/// A tracing layer that captures events in memory.
pub struct CaptureLayer {
    events: Arc<RwLock<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let captured = CapturedEvent {
            level: metadata.level().to_string(),
            target: metadata.target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        };
        if let Ok(mut events) = self.events.write() {
            events.push(captured);
        }
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: HashMap<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{value:?}")));
    }
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[test]
    fn captures_message_level_and_fields() {
        let events = CapturedEvents::new();
        let subscriber = tracing_subscriber::registry().with(events.layer());
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(chunk_count = 3usize, source = "a.txt", "chunked document");
            tracing::info!(error = %"boom", "failed");
        });

        let captured = events.events();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].level, "WARN");
        assert_eq!(captured[0].message, "chunked document");
        assert_eq!(captured[0].fields["chunk_count"], Value::from(3u64));
        assert_eq!(captured[0].field("source").as_deref(), Some("a.txt"));
        assert_eq!(events.find("failed").unwrap().field("error").as_deref(), Some("boom"));
    }

    #[test]
    fn clones_share_storage_and_clear_empties_it() {
        let events = CapturedEvents::new();
        let handle = events.clone();
        let subscriber = tracing_subscriber::registry().with(events.layer());
        tracing::subscriber::with_default(subscriber, || tracing::info!("hello"));

        assert_eq!(handle.events().len(), 1);
        handle.clear();
        assert!(events.events().is_empty());
    }
}
