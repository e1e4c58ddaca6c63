// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Context
//!
//! Unit of work over one [`Store`] and one [`EventPublisher`]. Committing an
//! aggregate saves it first and only then publishes the events it emitted;
//! if either step fails the events stay pending on the aggregate so a retry
//! publishes them.

use anyhow::Context;
use tracing::{debug, warn};

use crate::domain::aggregate::AggregateRoot;
use crate::domain::publisher::EventPublisher;
use crate::domain::store::{KeyValues, Store};

pub struct DomainContext<S, P> {
    store: S,
    publisher: P,
}

impl<S: Store, P: EventPublisher> DomainContext<S, P> {
    pub fn new(store: S, publisher: P) -> Self {
        Self { store, publisher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub async fn load<T: AggregateRoot>(&self, keys: KeyValues) -> anyhow::Result<Option<T>> {
        let description = format!("{keys:?}");
        self.store
            .load(keys)
            .await
            .with_context(|| format!("Failed to load {} for keys {}", T::table_name(), description))
    }

    /// Saves `root` and publishes its pending events.
    pub async fn commit<T: AggregateRoot>(&self, root: &mut T) -> anyhow::Result<()> {
        self.store
            .save(&*root)
            .await
            .with_context(|| format!("Failed to save {}", T::table_name()))?;

        let events = root.pending_events_mut().drain();
        if events.is_empty() {
            return Ok(());
        }

        debug!(
            aggregate = T::table_name(),
            count = events.len(),
            "Publishing committed events"
        );
        if let Err(e) = self.publisher.publish_all(events.clone()).await {
            warn!(aggregate = T::table_name(), "Event publication failed: {}", e);
            root.pending_events_mut().restore(events);
            return Err(e).with_context(|| {
                format!("Saved {} but failed to publish its events", T::table_name())
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregate::{DomainEvent, EntityEvents, PendingEvents, Persistable};
    use crate::domain::publisher::PublishError;
    use crate::infrastructure::{EventBus, InMemoryKeyValueClient, KeyValueStore};
    use crate::marshal::{param, Describe, Marshaller, ObjectLayout, TypeDescriptor};
    use async_trait::async_trait;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Tally {
        name: String,
        count: i64,
        events: PendingEvents,
    }

    #[derive(Debug)]
    struct Bumped;

    impl DomainEvent for Bumped {
        fn event_type(&self) -> &'static str {
            "Bumped"
        }
    }

    impl Tally {
        fn bump(&mut self) {
            self.count += 1;
            self.events.emit(Bumped);
        }
    }

    impl Describe for Tally {
        fn describe() -> TypeDescriptor {
            ObjectLayout::builder::<Self>()
                .constructor(&[param::<String>("name"), param::<i64>("count")], |args| {
                    Ok(Tally {
                        name: args.next()?,
                        count: args.next()?,
                        events: PendingEvents::new(),
                    })
                })
                .property("Name", |t: &Tally| &t.name)
                .property("Count", |t: &Tally| &t.count)
                .build()
        }
    }

    impl Persistable for Tally {
        fn domain_keys() -> &'static [&'static str] {
            &["Name"]
        }
    }

    impl AggregateRoot for Tally {
        fn pending_events(&self) -> &PendingEvents {
            &self.events
        }

        fn pending_events_mut(&mut self) -> &mut PendingEvents {
            &mut self.events
        }
    }

    #[derive(Debug)]
    struct MemberRenamed {
        name: String,
    }

    impl DomainEvent for MemberRenamed {
        fn event_type(&self) -> &'static str {
            "MemberRenamed"
        }
    }

    #[derive(Debug)]
    struct Member {
        name: String,
    }

    impl Member {
        fn rename(&mut self, name: &str, events: &mut EntityEvents<'_>) {
            self.name = name.to_string();
            events.emit(MemberRenamed {
                name: self.name.clone(),
            });
        }
    }

    impl Describe for Member {
        fn describe() -> TypeDescriptor {
            ObjectLayout::builder::<Self>()
                .constructor(&[param::<String>("name")], |args| {
                    Ok(Member { name: args.next()? })
                })
                .property("Name", |m: &Member| &m.name)
                .build()
        }
    }

    #[derive(Debug)]
    struct Roster {
        team: String,
        members: Vec<Member>,
        events: PendingEvents,
    }

    impl Roster {
        fn rename_member(&mut self, index: usize, name: &str) {
            self.members[index].rename(name, &mut self.events.for_entity());
        }
    }

    impl Describe for Roster {
        fn describe() -> TypeDescriptor {
            ObjectLayout::builder::<Self>()
                .constructor(
                    &[param::<String>("team"), param::<Vec<Member>>("members")],
                    |args| {
                        Ok(Roster {
                            team: args.next()?,
                            members: args.next()?,
                            events: PendingEvents::new(),
                        })
                    },
                )
                .property("Team", |r: &Roster| &r.team)
                .property("Members", |r: &Roster| &r.members)
                .build()
        }
    }

    impl Persistable for Roster {
        fn domain_keys() -> &'static [&'static str] {
            &["Team"]
        }
    }

    impl AggregateRoot for Roster {
        fn pending_events(&self) -> &PendingEvents {
            &self.events
        }

        fn pending_events_mut(&mut self) -> &mut PendingEvents {
            &mut self.events
        }
    }

    struct ClosedPublisher;

    #[async_trait]
    impl EventPublisher for ClosedPublisher {
        async fn publish(&self, _event: Arc<dyn DomainEvent>) -> Result<(), PublishError> {
            Err(PublishError::Closed)
        }
    }

    async fn store() -> KeyValueStore<InMemoryKeyValueClient> {
        let store = KeyValueStore::new(InMemoryKeyValueClient::new(), Marshaller::new());
        store.register::<Tally>().await.unwrap();
        store
    }

    fn tally() -> Tally {
        Tally {
            name: "visits".to_string(),
            count: 0,
            events: PendingEvents::new(),
        }
    }

    #[tokio::test]
    async fn test_commit_saves_then_publishes() {
        let bus = EventBus::new(8);
        let mut receiver = bus.subscribe();
        let context = DomainContext::new(store().await, bus);

        let mut tally = tally();
        tally.bump();
        tally.bump();
        context.commit(&mut tally).await.unwrap();
        assert!(tally.pending_events().is_empty());

        assert_eq!(receiver.try_recv().unwrap().event_type(), "Bumped");
        assert_eq!(receiver.try_recv().unwrap().event_type(), "Bumped");

        let loaded: Tally = context
            .load(KeyValues::of("visits".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.count, 2);
    }

    #[tokio::test]
    async fn test_entity_events_are_committed_with_the_root() {
        let store = KeyValueStore::new(InMemoryKeyValueClient::new(), Marshaller::new());
        store.register::<Roster>().await.unwrap();
        let bus = EventBus::new(8);
        let mut renames = bus.subscribe();
        let context = DomainContext::new(store, bus);

        let mut roster = Roster {
            team: "blue".to_string(),
            members: vec![
                Member { name: "ada".to_string() },
                Member { name: "alan".to_string() },
            ],
            events: PendingEvents::new(),
        };
        roster.rename_member(1, "grace");
        assert_eq!(roster.pending_events().len(), 1);

        context.commit(&mut roster).await.unwrap();
        assert!(roster.pending_events().is_empty());

        let event = renames.try_recv().unwrap();
        assert_eq!(event.downcast_ref::<MemberRenamed>().unwrap().name, "grace");

        let loaded: Roster = context
            .load(KeyValues::of("blue".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.members[1].name, "grace");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_events_pending() {
        let unregistered = KeyValueStore::new(InMemoryKeyValueClient::new(), Marshaller::new());
        let context = DomainContext::new(unregistered, EventBus::new(8));

        let mut tally = tally();
        tally.bump();
        let err = context.commit(&mut tally).await.unwrap_err();
        assert!(err.to_string().contains("Failed to save Tally"));
        assert_eq!(tally.pending_events().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_publish_restores_events() {
        let context = DomainContext::new(store().await, ClosedPublisher);

        let mut tally = tally();
        tally.bump();
        assert!(context.commit(&mut tally).await.is_err());
        assert_eq!(tally.pending_events().len(), 1);

        let saved: Option<Tally> = context
            .load(KeyValues::of("visits".to_string()))
            .await
            .unwrap();
        assert_eq!(saved.map(|t| t.count), Some(1));
    }
}
