// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure
//!
//! Adapters behind the domain ports.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Key-value persistence and in-process event delivery

pub mod event_bus;
pub mod key_value_client;
pub mod key_value_store;

pub use event_bus::{EventBus, EventBusError, EventReceiver, TypedEventReceiver};
pub use key_value_client::{ClientError, InMemoryKeyValueClient, KeyValueClient};
pub use key_value_store::KeyValueStore;
