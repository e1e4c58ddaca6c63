// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
// Event Bus Implementation - Pub/Sub for Domain Events
//
// In-process delivery of committed aggregate events over a tokio broadcast
// channel. Events are lost on restart; a broker-backed EventPublisher is
// required for durable delivery.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::aggregate::DomainEvent;
use crate::domain::config::PersistenceConfig;
use crate::domain::publisher::{EventPublisher, PublishError};

/// Event bus for publishing and subscribing to domain events
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<Arc<dyn DomainEvent>>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    /// Capacity determines how many events can be buffered before dropping old ones.
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            warn!("Event bus capacity of 0 requested, using 1");
        }
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (1000)
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self::new(config.event_bus_capacity)
    }

    /// Send to all current subscribers. Returns how many received it.
    pub fn send(&self, event: Arc<dyn DomainEvent>) -> usize {
        debug!(event_type = event.event_type(), "Publishing event: {:?}", event);

        let receiver_count = self.sender.send(event).unwrap_or(0);
        if receiver_count == 0 {
            debug!("No subscribers listening to event");
        }
        receiver_count
    }

    /// Subscribe to all domain events
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Subscribe to events of a single concrete type
    pub fn subscribe_to<E: DomainEvent + Clone>(&self) -> TypedEventReceiver<E> {
        TypedEventReceiver {
            receiver: self.sender.subscribe(),
            _marker: PhantomData,
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[async_trait]
impl EventPublisher for EventBus {
    async fn publish(&self, event: Arc<dyn DomainEvent>) -> Result<(), PublishError> {
        self.send(event);
        Ok(())
    }
}

fn recv_error(e: broadcast::error::RecvError) -> EventBusError {
    match e {
        broadcast::error::RecvError::Closed => EventBusError::Closed,
        broadcast::error::RecvError::Lagged(n) => {
            warn!("Event receiver lagged by {} events", n);
            EventBusError::Lagged(n)
        }
    }
}

fn try_recv_error(e: broadcast::error::TryRecvError) -> EventBusError {
    match e {
        broadcast::error::TryRecvError::Empty => EventBusError::Empty,
        broadcast::error::TryRecvError::Closed => EventBusError::Closed,
        broadcast::error::TryRecvError::Lagged(n) => {
            warn!("Event receiver lagged by {} events", n);
            EventBusError::Lagged(n)
        }
    }
}

/// Receiver for all domain events
pub struct EventReceiver {
    receiver: broadcast::Receiver<Arc<dyn DomainEvent>>,
}

impl EventReceiver {
    /// Receive the next event (waits until one is available)
    pub async fn recv(&mut self) -> Result<Arc<dyn DomainEvent>, EventBusError> {
        self.receiver.recv().await.map_err(recv_error)
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<Arc<dyn DomainEvent>, EventBusError> {
        self.receiver.try_recv().map_err(try_recv_error)
    }
}

/// Receiver filtered to one event type
pub struct TypedEventReceiver<E> {
    receiver: broadcast::Receiver<Arc<dyn DomainEvent>>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: DomainEvent + Clone> TypedEventReceiver<E> {
    /// Receive the next event of type `E`, skipping all others
    pub async fn recv(&mut self) -> Result<E, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(recv_error)?;
            if let Some(matching) = event.downcast_ref::<E>() {
                return Ok(matching.clone());
            }
        }
    }
}

/// Errors that can occur when receiving events
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}
