// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Keystone Core
//!
//! Persistence for domain aggregates without per-store mapping code.
//!
//! # Architecture
//!
//! - **marshal:** converts describable values to [`WireValue`] trees and back
//! - **domain:** aggregates, events, wire model, store and publisher ports
//! - **infrastructure:** key-value store adapter, in-memory client, event bus
//! - **application:** [`DomainContext`](application::DomainContext) unit of work

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod marshal;

pub use domain::*;
pub use marshal::{DecodePolicy, Describe, MarshalError, Marshaller, WireEnum};
