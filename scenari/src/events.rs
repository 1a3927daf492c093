use log::info;
use parking_lot::Mutex;
use serde_json::Value;

/// Audit sink owned by the network a layer belongs to.
pub trait LayerEventSink {
    /// Records an event that happened on a layer.
    ///
    /// # Arguments
    /// * `layer` - The name of the layer.
    /// * `message` - A human readable description of the event.
    /// * `context` - Extra data, usually the hyperparameters of whoever acted on the layer.
    fn log_layer_event(&self, layer: &str, message: &str, context: &Value);
}

/// Forwards every event to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl LayerEventSink for LogSink {
    fn log_layer_event(&self, layer: &str, message: &str, context: &Value) {
        info!(layer = layer; "{message} {context}");
    }
}

/// A single recorded layer event.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerEvent {
    pub layer: String,
    pub message: String,
    pub context: Value,
}

/// Keeps every event in memory, in arrival order, besides forwarding it to `log`.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<LayerEvent>>,
}

impl EventLog {
    /// Creates a new empty `EventLog`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far.
    pub fn events(&self) -> Vec<LayerEvent> {
        self.events.lock().clone()
    }

    /// Returns the amount of events recorded so far.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns `true` if nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl LayerEventSink for EventLog {
    fn log_layer_event(&self, layer: &str, message: &str, context: &Value) {
        LogSink.log_layer_event(layer, message, context);

        self.events.lock().push(LayerEvent {
            layer: layer.to_string(),
            message: message.to_string(),
            context: context.clone(),
        });
    }
}
