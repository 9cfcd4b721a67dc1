use huddle_client::SignalSink;
use huddle_core::ClientSignal;
use std::sync::{Arc, Mutex};

/// SignalSink that keeps every envelope it is given.
#[derive(Clone, Default)]
pub struct RecordingSink {
    signals: Arc<Mutex<Vec<ClientSignal>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> Vec<ClientSignal> {
        self.signals.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<ClientSignal> {
        std::mem::take(&mut *self.signals.lock().unwrap())
    }

    pub fn count(&self, event: &str) -> usize {
        self.signals
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.event_name() == event)
            .count()
    }
}

impl SignalSink for RecordingSink {
    fn send_signal(&self, signal: ClientSignal) {
        tracing::debug!("[RecordingSink] {}", signal.event_name());
        self.signals.lock().unwrap().push(signal);
    }
}
