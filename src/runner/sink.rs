//! Step Event Sinks
//!
//! The run loop reports one event per step: `Do` right before an action
//! is invoked, `Skip` when a step is bypassed. Sinks decide what to do
//! with them.

use std::fmt;

use log::info;

/// Discriminates performed steps from bypassed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Step is about to execute
    Do,
    /// Step was bypassed
    Skip,
}

/// A single status event emitted by the run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEvent {
    pub kind: EventKind,
    /// Index of the step
    pub index: usize,
    /// Name of the step
    pub name: String,
    /// Index of the last step in the sequence
    pub last: usize,
}

impl fmt::Display for StepEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            EventKind::Do => "DO",
            EventKind::Skip => "SKIP",
        };
        write!(f, "{}\t[{}/0-{}]\t{:?}", label, self.index, self.last, self.name)
    }
}

/// Consumer of step events.
pub trait StepSink {
    fn record(&mut self, event: &StepEvent);
}

impl<F> StepSink for F
where
    F: FnMut(&StepEvent),
{
    fn record(&mut self, event: &StepEvent) {
        self(event)
    }
}

/// Writes every event through the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl StepSink for LogSink {
    fn record(&mut self, event: &StepEvent) {
        info!("{}", event);
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<StepEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    pub fn events(&self) -> &[StepEvent] {
        &self.events
    }

    /// Names of the steps reported as performed, in order.
    pub fn performed(&self) -> Vec<&str> {
        self.names_of(EventKind::Do)
    }

    /// Names of the steps reported as skipped, in order.
    pub fn skipped(&self) -> Vec<&str> {
        self.names_of(EventKind::Skip)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Renders one display line per event.
    pub fn render(&self) -> String {
        self.events
            .iter()
            .map(|event| event.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn names_of(&self, kind: EventKind) -> Vec<&str> {
        self.events
            .iter()
            .filter(|event| event.kind == kind)
            .map(|event| event.name.as_str())
            .collect()
    }
}

impl StepSink for RecordingSink {
    fn record(&mut self, event: &StepEvent) {
        self.events.push(event.clone());
    }
}
