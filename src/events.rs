//! Telemetry events emitted while building the context and running heuristics.
//!
//! The planner only produces events; what happens to them is up to the sink.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Dev,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SkippedObjects,
    NotAccessibleOrders,
    ContextBuilt,
    MatrixRequested,
    RunFinished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub message: String,
}

impl Event {
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Receiver of planner telemetry.
pub trait EventSink {
    fn emit(&self, level: EventLevel, event: Event);

    fn info(&self, kind: EventKind, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(EventLevel::Info, Event::new(kind, message));
    }

    fn dev(&self, kind: EventKind, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(EventLevel::Dev, Event::new(kind, message));
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

impl EventSink for TracingEvents {
    fn emit(&self, level: EventLevel, event: Event) {
        match level {
            EventLevel::Info => tracing::info!(kind = ?event.kind, "{}", event.message),
            EventLevel::Dev => tracing::debug!(kind = ?event.kind, "{}", event.message),
        }
    }
}

/// Keeps every event in memory. Handy for hosts that batch telemetry.
#[derive(Debug, Default)]
pub struct RecordedEvents {
    events: Mutex<Vec<(EventLevel, Event)>>,
}

impl RecordedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(EventLevel, Event)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|(_, event)| event.kind == kind)
            .map(|(_, event)| event)
            .collect()
    }
}

impl EventSink for RecordedEvents {
    fn emit(&self, level: EventLevel, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push((level, event));
        }
    }
}
