use async_trait::async_trait;

use crate::events::{AuthEvent, Listener};

/// Emits every event as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl TracingListener {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &AuthEvent) {
        tracing::info!(
            target: "latchkey::events",
            event = event.name(),
            at = %event.timestamp(),
            ?event,
        );
    }
}
