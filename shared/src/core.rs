use crate::schema::EnrichedEvent;
use async_trait::async_trait;

#[cfg(any(test, feature = "mocks"))]
use mockall::automock;

/// Downstream storage for shredded events.
#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait EventSink {
    async fn write(&self, event: &EnrichedEvent) -> Result<(), String>;
}
