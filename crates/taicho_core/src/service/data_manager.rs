//! Generic per-entity data manager.
//!
//! # Responsibility
//! - Provide typed create/read/update/delete over the entity store.
//! - Turn store commit notifications into three typed channels:
//!   inserted, updated and deleted.
//!
//! # Invariants
//! - Registers with the store exactly once, at construction, and is called
//!   synchronously by every successful `save_context`.
//! - Only committed changes are delivered, one batch per channel per commit,
//!   and empty batches are never sent.
//! - Inserted and updated batches carry entities as committed; deleted
//!   batches carry identities since the records no longer exist.

use crate::model::EntityId;
use crate::notify::Publisher;
use crate::repo::changes::{ChangeKind, ContextDidSave};
use crate::repo::entity_store::{CommitObserver, EntityStore, StoreResult};
use crate::repo::query::{Predicate, SortOrder};
use crate::repo::schema::{field, Entity};
use log::{debug, error};
use std::rc::{Rc, Weak};
use std::sync::mpsc::Receiver;

/// Typed data access and change channels for one entity kind.
pub struct EntityDataManager<E: Entity> {
    channels: Rc<ChangeChannels<E>>,
}

struct ChangeChannels<E: Entity> {
    inserted: Publisher<Vec<E>>,
    updated: Publisher<Vec<E>>,
    deleted: Publisher<Vec<EntityId>>,
}

impl<E: Entity> EntityDataManager<E> {
    /// Creates the manager and registers it for every commit of `store`.
    pub fn new(store: &EntityStore) -> Self {
        let channels = Rc::new(ChangeChannels {
            inserted: Publisher::new(),
            updated: Publisher::new(),
            deleted: Publisher::new(),
        });
        let observer: Weak<ChangeChannels<E>> = Rc::downgrade(&channels);
        store.observe(observer);
        Self { channels }
    }

    /// Receives committed inserts, one batch per commit.
    pub fn subscribe_inserted(&self) -> Receiver<Vec<E>> {
        self.channels.inserted.subscribe()
    }

    /// Receives committed updates, one batch per commit.
    pub fn subscribe_updated(&self) -> Receiver<Vec<E>> {
        self.channels.updated.subscribe()
    }

    /// Receives ids of committed deletes, one batch per commit.
    pub fn subscribe_deleted(&self) -> Receiver<Vec<EntityId>> {
        self.channels.deleted.subscribe()
    }

    /// Stages a new record built from a store-assigned id.
    pub fn create_with(
        &self,
        store: &mut EntityStore,
        build: impl FnOnce(EntityId) -> E,
    ) -> StoreResult<E> {
        store.create_new_object(build)
    }

    /// Single fetch; logs and returns `None` on query failure.
    pub fn get(&self, store: &EntityStore, id: EntityId) -> Option<E> {
        match store.get_object::<E>(id) {
            Ok(entity) => entity,
            Err(err) => {
                error!(
                    "event=store_query module=data_manager status=error entity={} id={} error={}",
                    E::KIND,
                    id,
                    err
                );
                None
            }
        }
    }

    /// All records, in no guaranteed order. Query faults yield an empty list.
    pub fn get_all(&self, store: &EntityStore) -> Vec<E> {
        store.get_all_objects(None, None)
    }

    /// Records matching `predicate`, ordered by `sort`; empty on query faults.
    pub fn fetch(
        &self,
        store: &EntityStore,
        predicate: Option<&Predicate>,
        sort: Option<&SortOrder>,
    ) -> Vec<E> {
        store.get_all_objects(predicate, sort)
    }

    /// Stages new field values; the caller commits with `save_context`.
    pub fn update(&self, store: &mut EntityStore, entity: &E) -> StoreResult<()> {
        store.update(entity)
    }

    /// Stages removal; the caller commits with `save_context`.
    pub fn delete(&self, store: &mut EntityStore, entities: &[E]) -> StoreResult<()> {
        store.delete(entities)
    }
}

impl<E: Entity> CommitObserver for ChangeChannels<E> {
    fn context_did_save(&self, store: &EntityStore, saved: &ContextDidSave) {
        let inserted = saved.ids(E::KIND, ChangeKind::Inserted);
        let updated = saved.ids(E::KIND, ChangeKind::Updated);
        let deleted = saved.ids(E::KIND, ChangeKind::Deleted);
        if inserted.is_empty() && updated.is_empty() && deleted.is_empty() {
            return;
        }

        if !inserted.is_empty() {
            self.inserted.publish(load_committed(store, inserted));
        }
        if !updated.is_empty() {
            self.updated.publish(load_committed(store, updated));
        }
        if !deleted.is_empty() {
            self.deleted.publish(deleted.to_vec());
        }
        debug!(
            "event=changes_dispatched module=data_manager entity={} sequence={} inserted={} updated={} deleted={}",
            E::KIND,
            saved.sequence,
            inserted.len(),
            updated.len(),
            deleted.len()
        );
    }
}

/// Loads `ids` in batch order.
fn load_committed<E: Entity>(store: &EntityStore, ids: &[EntityId]) -> Vec<E> {
    let predicate = Predicate::any_of(field::ID, ids.iter().map(|id| id.to_string()));
    let mut loaded = store.get_all_objects::<E>(Some(&predicate), None);
    if loaded.len() != ids.len() {
        debug!(
            "event=changes_dispatched module=data_manager entity={} status=partial expected={} loaded={}",
            E::KIND,
            ids.len(),
            loaded.len()
        );
    }
    loaded.sort_by_key(|entity| ids.iter().position(|id| *id == entity.id()));
    loaded
}
