// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Aggregates, events, the wire data model and the persistence ports.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Types and traits shared by every store adapter

pub mod aggregate;
pub mod config;
pub mod publisher;
pub mod store;
pub mod wire;

pub use aggregate::{AggregateRoot, DomainEvent, EntityEvents, PendingEvents, Persistable};
pub use config::PersistenceConfig;
pub use publisher::{EventPublisher, PublishError};
pub use store::{KeyValues, Store, StoreError};
pub use wire::{AttributeMap, WireValue};
