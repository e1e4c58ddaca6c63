// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Aggregates and Domain Events
//!
//! | Type | Role |
//! |------|------|
//! | [`Persistable`] | a describable type with ordered identity fields |
//! | [`AggregateRoot`] | a persistable type that buffers domain events |
//! | [`DomainEvent`] | something that happened to an aggregate |
//! | [`PendingEvents`] | events emitted but not yet published |
//! | [`EntityEvents`] | a child entity's view of its root's pending events |
//!
//! Events are published by the application layer after the aggregate has
//! been saved, never before.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::marshal::Describe;

/// A type the stores know how to file and find again.
pub trait Persistable: Describe + Sync {
    /// Identity fields, in the order callers supply key values.
    fn domain_keys() -> &'static [&'static str];

    /// Table (or collection) name. Defaults to the bare type name.
    fn table_name() -> &'static str {
        short_type_name::<Self>()
    }
}

pub trait AggregateRoot: Persistable {
    fn pending_events(&self) -> &PendingEvents;

    fn pending_events_mut(&mut self) -> &mut PendingEvents;
}

pub trait DomainEvent: Any + fmt::Debug + Send + Sync {
    /// Stable event name, e.g. `"AccountOpened"`.
    fn event_type(&self) -> &'static str;
}

impl dyn DomainEvent {
    pub fn is<E: DomainEvent>(&self) -> bool {
        (self as &dyn Any).is::<E>()
    }

    pub fn downcast_ref<E: DomainEvent>(&self) -> Option<&E> {
        (self as &dyn Any).downcast_ref::<E>()
    }
}

/// Events emitted by an aggregate since it was last committed.
#[derive(Debug, Clone, Default)]
pub struct PendingEvents {
    events: Vec<Arc<dyn DomainEvent>>,
}

impl PendingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit<E: DomainEvent>(&mut self, event: E) {
        self.events.push(Arc::new(event));
    }

    /// Takes every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<Arc<dyn DomainEvent>> {
        std::mem::take(&mut self.events)
    }

    /// Puts undelivered events back in front of anything emitted since.
    pub fn restore(&mut self, mut events: Vec<Arc<dyn DomainEvent>>) {
        events.append(&mut self.events);
        self.events = events;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn DomainEvent>> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Handle for a child entity; what it emits joins this buffer.
    pub fn for_entity(&mut self) -> EntityEvents<'_> {
        EntityEvents { root: self }
    }
}

/// Emit handle lent to an entity nested inside an aggregate. Entities have
/// no buffer of their own, so their events are committed with the root's.
///
/// ```
/// use keystone_core::domain::aggregate::{DomainEvent, EntityEvents, PendingEvents};
///
/// #[derive(Debug)]
/// struct Renamed;
///
/// impl DomainEvent for Renamed {
///     fn event_type(&self) -> &'static str {
///         "Renamed"
///     }
/// }
///
/// struct Line {
///     label: String,
/// }
///
/// impl Line {
///     fn rename(&mut self, label: &str, events: &mut EntityEvents<'_>) {
///         self.label = label.to_string();
///         events.emit(Renamed);
///     }
/// }
///
/// let mut pending = PendingEvents::new();
/// let mut line = Line { label: "a".to_string() };
/// line.rename("b", &mut pending.for_entity());
/// assert_eq!(pending.len(), 1);
/// ```
#[derive(Debug)]
pub struct EntityEvents<'a> {
    root: &'a mut PendingEvents,
}

impl EntityEvents<'_> {
    pub fn emit<E: DomainEvent>(&mut self, event: E) {
        self.root.emit(event);
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
