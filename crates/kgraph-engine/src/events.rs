//! The minimal event-emission surface the kernel calls after a successful
//! mutation. Dispatch itself is an external collaborator's concern — the
//! kernel only calls [`EventSink::fire_event`] if one has been registered.

use std::collections::HashMap;

/// A collaborator that receives dotted-tag events from the kernel.
///
/// Absence of a registered sink is permissible (e.g. during the
/// early-initialization window before a caller wires one up) — the kernel
/// simply skips emission.
pub trait EventSink {
    /// Receive one event: `requisites` is a small set of dotted tags (e.g.
    /// `subject.network`, `verb.created`, `object.node`), `payload` is a
    /// flat string map of event-specific fields.
    fn fire_event(&mut self, requisites: &[&str], payload: &HashMap<String, String>);
}

/// An [`EventSink`] that records every event it receives, for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Every event received, in order, as `(requisites, payload)`.
    pub events: Vec<(Vec<String>, HashMap<String, String>)>,
}

impl EventSink for RecordingSink {
    fn fire_event(&mut self, requisites: &[&str], payload: &HashMap<String, String>) {
        self.events.push((
            requisites.iter().map(|s| s.to_string()).collect(),
            payload.clone(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_events_in_order() {
        let mut sink = RecordingSink::default();
        let mut payload = HashMap::new();
        payload.insert("node_id".to_string(), "x".to_string());
        sink.fire_event(&["subject.network", "verb.created"], &payload);
        sink.fire_event(&["subject.network", "verb.erased"], &payload);
        assert_eq!(sink.events.len(), 2);
        assert!(sink.events[0].0.contains(&"verb.created".to_string()));
        assert!(sink.events[1].0.contains(&"verb.erased".to_string()));
    }
}
