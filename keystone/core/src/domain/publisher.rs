// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::aggregate::DomainEvent;

/// Outbound port for domain events. The in-process implementation is
/// `crate::infrastructure::EventBus`; broker-backed publishers implement the
/// same trait.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: Arc<dyn DomainEvent>) -> Result<(), PublishError>;

    /// Publishes in order, stopping at the first failure.
    async fn publish_all(&self, events: Vec<Arc<dyn DomainEvent>>) -> Result<(), PublishError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Publisher is closed")]
    Closed,

    #[error("Publisher backend error: {0}")]
    Backend(String),
}
