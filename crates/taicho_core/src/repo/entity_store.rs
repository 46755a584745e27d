//! Entity store: the single gateway to persisted records.
//!
//! # Responsibility
//! - Stage creates, updates and deletes in one working context.
//! - Commit the working context atomically and publish what changed.
//! - Run filtered, ordered fetches over registered entity kinds.
//!
//! # Invariants
//! - The working context is an open SQLite transaction on the store's only
//!   connection; reads on that connection observe staged changes.
//! - Nothing is published for staged changes until `save_context` commits.
//! - Commit observers run inside `save_context`, after the commit and before
//!   it returns, so every commit path fans out exactly once.
//! - Fetch failures never panic; `get_all_objects` degrades to empty.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::fault::FaultPolicy;
use crate::model::validation::ValidationError;
use crate::model::EntityId;
use crate::notify::Publisher;
use crate::repo::changes::{ChangeKind, ChangeLedger, ContextDidSave};
use crate::repo::query::{build_select, Predicate, SortOrder};
use crate::repo::schema::{Entity, EntityKind, ID_COLUMN};
use log::{debug, error, info, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Weak;
use std::sync::mpsc::Receiver;
use std::time::Instant;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for entity store and data manager operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// The entity kind or name is not registered with this store.
    UnregisteredEntity(String),
    /// A predicate or sort order named a field the entity does not map.
    UnknownField {
        entity: &'static str,
        field: String,
    },
    Validation(ValidationError),
    /// A uniqueness or other SQLite constraint rejected the write.
    Constraint {
        entity: &'static str,
        message: String,
    },
    NotFound {
        entity: &'static str,
        id: EntityId,
    },
    /// Persisted state could not be decoded.
    InvalidData(String),
    /// `save_context` failed; the working context was rolled back.
    Commit(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UnregisteredEntity(name) => write!(f, "entity `{name}` is not registered"),
            Self::UnknownField { entity, field } => {
                write!(f, "entity `{entity}` has no field `{field}`")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Constraint { entity, message } => {
                write!(f, "constraint violated for `{entity}`: {message}")
            }
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Commit(err) => write!(f, "failed to save context: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) | Self::Commit(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Receives every successful commit while the store is still borrowed.
///
/// Observers may read through `store` to load committed records; the working
/// context is closed at that point, so reads see exactly the committed state.
pub trait CommitObserver {
    fn context_did_save(&self, store: &EntityStore, saved: &ContextDidSave);
}

/// Owns the store connection, the working context and commit notifications.
pub struct EntityStore {
    conn: Connection,
    registered: Vec<EntityKind>,
    ledger: ChangeLedger,
    faults: FaultPolicy,
    saves: Publisher<ContextDidSave>,
    observers: RefCell<Vec<Weak<dyn CommitObserver>>>,
    sequence: u64,
}

impl EntityStore {
    /// Opens (or creates) the store file with every entity kind registered.
    pub fn open(path: impl AsRef<Path>, faults: FaultPolicy) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?, faults))
    }

    /// Opens a private in-memory store with every entity kind registered.
    pub fn open_in_memory(faults: FaultPolicy) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?, faults))
    }

    /// Wraps a migrated connection with every entity kind registered.
    pub fn from_connection(conn: Connection, faults: FaultPolicy) -> Self {
        Self::with_kinds(conn, &EntityKind::ALL, faults)
    }

    /// Wraps a migrated connection registering only `kinds`.
    pub fn with_kinds(conn: Connection, kinds: &[EntityKind], faults: FaultPolicy) -> Self {
        Self {
            conn,
            registered: kinds.to_vec(),
            ledger: ChangeLedger::default(),
            faults,
            saves: Publisher::new(),
            observers: RefCell::new(Vec::new()),
            sequence: 0,
        }
    }

    /// Policy applied to undecodable persisted rows.
    pub fn fault_policy(&self) -> FaultPolicy {
        self.faults
    }

    /// Raw connection access for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether `kind` may be created, fetched, updated or deleted here.
    pub fn is_registered(&self, kind: EntityKind) -> bool {
        self.registered.contains(&kind)
    }

    /// Resolves an entity name to a kind registered with this store.
    pub fn entity_kind_named(&self, name: &str) -> StoreResult<EntityKind> {
        EntityKind::from_entity_name(name)
            .filter(|kind| self.is_registered(*kind))
            .ok_or_else(|| StoreError::UnregisteredEntity(name.to_string()))
    }

    /// Returns a receiver of every future [`ContextDidSave`].
    pub fn subscribe(&self) -> Receiver<ContextDidSave> {
        self.saves.subscribe()
    }

    /// Registers `observer` to run on every future commit.
    ///
    /// The store keeps a weak reference; dropping the observer unregisters it.
    pub fn observe(&self, observer: Weak<dyn CommitObserver>) {
        self.observers.borrow_mut().push(observer);
    }

    /// Number of observers still alive.
    pub fn observer_count(&self) -> usize {
        self.observers
            .borrow()
            .iter()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }

    /// Allocates an id, builds the record and stages its insert.
    ///
    /// The returned entity is uncommitted until [`Self::save_context`].
    pub fn create_new_object<E: Entity>(
        &mut self,
        build: impl FnOnce(EntityId) -> E,
    ) -> StoreResult<E> {
        self.ensure_registered(E::KIND)?;
        let entity = build(Uuid::new_v4()).into_stored();
        entity.validate()?;

        let schema = E::KIND.schema();
        let columns = schema.select_list();
        let placeholders = vec!["?"; schema.fields.len() + 1].join(", ");
        let sql = format!(
            "INSERT INTO {} ({columns}) VALUES ({placeholders});",
            schema.table
        );

        self.begin_working_context()?;
        self.conn
            .execute(&sql, params_from_iter(row_values(&entity)))
            .map_err(|err| map_write_error(err, E::KIND))?;

        self.ledger.record_insert(E::KIND, entity.id());
        debug!(
            "event=object_staged module=store change=insert entity={} id={}",
            E::KIND,
            entity.id()
        );
        Ok(entity)
    }

    /// Stages new field values for an existing record.
    ///
    /// Values are written in their stored form (see [`Entity::into_stored`]).
    pub fn update<E: Entity>(&mut self, entity: &E) -> StoreResult<()> {
        self.ensure_registered(E::KIND)?;
        entity.validate()?;

        let schema = E::KIND.schema();
        let assignments = schema
            .fields
            .iter()
            .map(|mapping| format!("{} = ?", mapping.column))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {ID_COLUMN} = ?;",
            schema.table
        );
        let mut values = entity.to_values();
        values.push(Value::Text(entity.id().to_string()));

        self.begin_working_context()?;
        let changed = self
            .conn
            .execute(&sql, params_from_iter(values))
            .map_err(|err| map_write_error(err, E::KIND))?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: E::KIND.entity_name(),
                id: entity.id(),
            });
        }

        self.ledger.record_update(E::KIND, entity.id());
        debug!(
            "event=object_staged module=store change=update entity={} id={}",
            E::KIND,
            entity.id()
        );
        Ok(())
    }

    /// Stages removal of `entities`. Records already gone are skipped.
    pub fn delete<E: Entity>(&mut self, entities: &[E]) -> StoreResult<()> {
        self.ensure_registered(E::KIND)?;
        if entities.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "DELETE FROM {} WHERE {ID_COLUMN} = ?1;",
            E::KIND.schema().table
        );
        self.begin_working_context()?;
        for entity in entities {
            let changed = self.conn.execute(&sql, [entity.id().to_string()])?;
            if changed == 0 {
                warn!(
                    "event=object_staged module=store status=skipped change=delete entity={} id={}",
                    E::KIND,
                    entity.id()
                );
                continue;
            }
            self.ledger.record_delete(E::KIND, entity.id());
            debug!(
                "event=object_staged module=store change=delete entity={} id={}",
                E::KIND,
                entity.id()
            );
        }
        Ok(())
    }

    /// Fetches one record by id, including staged changes.
    pub fn get_object<E: Entity>(&self, id: EntityId) -> StoreResult<Option<E>> {
        let predicate = Predicate::equals(ID_COLUMN, id.to_string());
        Ok(self
            .try_get_all_objects::<E>(Some(&predicate), None)?
            .into_iter()
            .next())
    }

    /// Fetches all records matching `predicate`, ordered by `sort`.
    ///
    /// Rows that fail to decode are reported through the fault policy and
    /// skipped.
    pub fn try_get_all_objects<E: Entity>(
        &self,
        predicate: Option<&Predicate>,
        sort: Option<&SortOrder>,
    ) -> StoreResult<Vec<E>> {
        self.ensure_registered(E::KIND)?;
        let (sql, binds) = build_select(E::KIND.schema(), predicate, sort)?;

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            match E::from_row(row, self.faults) {
                Ok(entity) => entities.push(entity),
                Err(StoreError::InvalidData(message)) => {
                    self.faults.integrity_fault("store", &message);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(entities)
    }

    /// Like [`Self::try_get_all_objects`] but logs failures and returns empty.
    pub fn get_all_objects<E: Entity>(
        &self,
        predicate: Option<&Predicate>,
        sort: Option<&SortOrder>,
    ) -> Vec<E> {
        match self.try_get_all_objects(predicate, sort) {
            Ok(entities) => entities,
            Err(err) => {
                error!(
                    "event=store_query module=store status=error entity={} error={}",
                    E::KIND,
                    err
                );
                Vec::new()
            }
        }
    }

    /// Whether the working context holds uncommitted changes.
    pub fn has_changes(&self) -> bool {
        !self.ledger.is_empty()
    }

    /// Commits the working context as one atomic unit.
    ///
    /// Returns `Ok(None)` when nothing net changed. On success the returned
    /// notification has also been published to every subscriber.
    ///
    /// # Errors
    /// - `StoreError::Commit` when SQLite rejects the commit. The working
    ///   context is rolled back and its staged changes are discarded.
    pub fn save_context(&mut self) -> StoreResult<Option<ContextDidSave>> {
        if self.conn.is_autocommit() {
            self.ledger.clear();
            return Ok(None);
        }

        let started_at = Instant::now();
        if let Err(err) = self.conn.execute_batch("COMMIT;") {
            error!(
                "event=context_save module=store status=error duration_ms={} error_code=commit_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            self.discard_working_context();
            return Err(StoreError::Commit(DbError::Sqlite(err)));
        }

        let batches = std::mem::take(&mut self.ledger).into_batches();
        if batches.is_empty() {
            debug!("event=context_save module=store status=noop");
            return Ok(None);
        }

        self.sequence += 1;
        let saved = ContextDidSave {
            sequence: self.sequence,
            batches,
        };
        info!(
            "event=context_save module=store status=ok sequence={} inserted={} updated={} deleted={} duration_ms={}",
            saved.sequence,
            saved.count(ChangeKind::Inserted),
            saved.count(ChangeKind::Updated),
            saved.count(ChangeKind::Deleted),
            started_at.elapsed().as_millis()
        );
        self.saves.publish(saved.clone());
        self.notify_observers(&saved);
        Ok(Some(saved))
    }

    /// Discards every staged change without publishing anything.
    pub fn rollback(&mut self) -> StoreResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK;")?;
            info!("event=context_rollback module=store status=ok");
        }
        self.ledger.clear();
        Ok(())
    }

    fn notify_observers(&self, saved: &ContextDidSave) {
        let live = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|observer| observer.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect::<Vec<_>>()
        };
        for observer in live {
            observer.context_did_save(self, saved);
        }
    }

    fn ensure_registered(&self, kind: EntityKind) -> StoreResult<()> {
        if self.is_registered(kind) {
            Ok(())
        } else {
            Err(StoreError::UnregisteredEntity(kind.entity_name().to_string()))
        }
    }

    fn begin_working_context(&self) -> StoreResult<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN DEFERRED;")?;
        }
        Ok(())
    }

    fn discard_working_context(&mut self) {
        if !self.conn.is_autocommit() {
            if let Err(err) = self.conn.execute_batch("ROLLBACK;") {
                error!("event=context_rollback module=store status=error error={err}");
            }
        }
        self.ledger.clear();
    }
}

fn row_values<E: Entity>(entity: &E) -> Vec<Value> {
    let mut values = vec![Value::Text(entity.id().to_string())];
    values.extend(entity.to_values());
    values
}

fn map_write_error(err: rusqlite::Error, kind: EntityKind) -> StoreError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            return StoreError::Constraint {
                entity: kind.entity_name(),
                message: message.clone().unwrap_or_else(|| failure.to_string()),
            };
        }
    }
    StoreError::Db(DbError::Sqlite(err))
}
