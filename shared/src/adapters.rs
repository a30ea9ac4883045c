use crate::core::EventSink;
use crate::schema::EnrichedEvent;
use async_trait::async_trait;

/// Emits each event as one JSON line through `tracing`.
#[derive(Debug, Clone)]
pub struct LogEventSink {
    target: String,
}

impl LogEventSink {
    pub fn new(target: String) -> Self {
        Self { target }
    }

    pub fn render(&self, event: &EnrichedEvent) -> Result<String, String> {
        serde_json::to_string(event).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl EventSink for LogEventSink {
    async fn write(&self, event: &EnrichedEvent) -> Result<(), String> {
        let line = self.render(event)?;
        tracing::info!(sink = %self.target, event = %line, "enriched event");
        Ok(())
    }
}
