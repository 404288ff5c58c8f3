//! Persisted collection store.
//!
//! A [`Collection`] holds every record of one type in insertion order and mirrors the whole
//! sequence, as a JSON array, to a single key of a [`KeyValueStore`].
//!
//! ## Failure model
//!
//! - A missing or malformed stored value is logged and replaced by the record type's fallback
//!   (empty, or its seed records under [`SeedPolicy::Demo`]).
//! - A failed write after `add`/`update` is logged; the in-memory collection stays
//!   authoritative for the session. [`Collection::flush`] surfaces the error when a caller
//!   needs it.
//! - Updating an unknown id is a no-op.
//!
//! ## Typed patches
//!
//! Partial updates go through a per-record patch struct whose fields are all `Option`. Each
//! `Some` field replaces the record's field; `None` leaves it alone. Request records expose no
//! status or stage fields in their patch, so lifecycle state can only move through
//! [`Collection::modify`] callers in the lifecycle module.

use crate::config::SeedPolicy;
use crate::error::{WardError, WardResult};
use crate::storage::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// A persisted domain entity.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Backing-store key holding the serialised collection.
    const STORAGE_KEY: &'static str;

    /// Field-by-field partial update for this record type.
    type Patch: Patch<Self>;

    fn id(&self) -> &str;

    fn patient_id(&self) -> &str;

    /// Records used when the stored collection is absent and seeding is enabled.
    fn seed() -> Vec<Self> {
        Vec::new()
    }
}

/// A typed partial update.
pub trait Patch<R> {
    fn apply_to(self, record: &mut R);
}

/// Declares a patch struct with one `Option` per listed record field, plus its [`Patch`] impl.
macro_rules! record_patch {
    ($(#[$meta:meta])* $patch:ident for $record:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $patch {
            $(pub $field: Option<$ty>,)*
        }

        impl $crate::collection::Patch<$record> for $patch {
            fn apply_to(self, record: &mut $record) {
                $(
                    if let Some(value) = self.$field {
                        record.$field = value;
                    }
                )*
            }
        }
    };
}
pub(crate) use record_patch;

/// Ordered, store-backed set of records of one type.
pub struct Collection<R> {
    store: Arc<dyn KeyValueStore>,
    records: Vec<R>,
}

impl<R: Record> Collection<R> {
    /// Loads the collection stored under `R::STORAGE_KEY`.
    ///
    /// Never fails: unreadable or malformed values fall back as described in the module docs.
    pub fn load(store: Arc<dyn KeyValueStore>, seed: SeedPolicy) -> Self {
        let key = R::STORAGE_KEY;
        let records = match store.get(key) {
            Ok(Some(text)) => match parse_records::<R>(&text) {
                Ok(records) => records,
                Err(reason) => {
                    tracing::warn!(key, %reason, "stored collection is malformed, using fallback");
                    fallback::<R>(seed)
                }
            },
            Ok(None) => fallback::<R>(seed),
            Err(error) => {
                tracing::warn!(key, %error, "failed to read stored collection, using fallback");
                fallback::<R>(seed)
            }
        };

        Self { store, records }
    }

    pub fn list(&self) -> &[R] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn filter_by_patient<'a>(&'a self, patient_id: &'a str) -> impl Iterator<Item = &'a R> {
        self.records
            .iter()
            .filter(move |r| r.patient_id() == patient_id)
    }

    /// Appends `record` and persists the collection.
    ///
    /// # Errors
    ///
    /// Returns [`WardError::DuplicateId`] if a record with the same id already exists. Storage
    /// failures are logged, not returned.
    pub fn add(&mut self, record: R) -> WardResult<()> {
        self.ensure_new_id(record.id())?;
        self.records.push(record);
        self.persist();
        Ok(())
    }

    /// Appends every record in `batch` with a single write.
    ///
    /// The batch is rejected as a whole if any id collides with an existing record or with
    /// another record in the batch.
    pub fn add_many(&mut self, batch: Vec<R>) -> WardResult<usize> {
        let mut seen = HashSet::new();
        for record in &batch {
            self.ensure_new_id(record.id())?;
            if !seen.insert(record.id().to_owned()) {
                return Err(WardError::DuplicateId {
                    collection: R::STORAGE_KEY,
                    id: record.id().to_owned(),
                });
            }
        }

        let added = batch.len();
        if added > 0 {
            self.records.extend(batch);
            self.persist();
        }
        Ok(added)
    }

    /// Merges `patch` into the record with `id` and persists.
    ///
    /// Returns `false` without touching storage when no record has that id.
    pub fn update(&mut self, id: &str, patch: R::Patch) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id() == id) else {
            tracing::debug!(key = R::STORAGE_KEY, id, "update for unknown record ignored");
            return false;
        };

        patch.apply_to(record);
        self.persist();
        true
    }

    /// Applies a fallible change to the record with `id`.
    ///
    /// `change` works on a copy; the record is replaced and persisted only if it succeeds.
    /// Returns `Ok(None)` when no record has that id.
    pub(crate) fn modify<T>(
        &mut self,
        id: &str,
        change: impl FnOnce(&mut R) -> WardResult<T>,
    ) -> WardResult<Option<T>> {
        let Some(index) = self.records.iter().position(|r| r.id() == id) else {
            tracing::debug!(key = R::STORAGE_KEY, id, "change for unknown record ignored");
            return Ok(None);
        };

        let mut draft = self.records[index].clone();
        let outcome = change(&mut draft)?;
        self.records[index] = draft;
        self.persist();
        Ok(Some(outcome))
    }

    /// Writes the full collection to the backing store.
    ///
    /// # Errors
    ///
    /// Returns [`WardError::Serialization`] or [`WardError::Storage`].
    pub fn flush(&self) -> WardResult<()> {
        let text = serde_json::to_string(&self.records).map_err(WardError::Serialization)?;
        self.store.set(R::STORAGE_KEY, &text)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(error) = self.flush() {
            tracing::warn!(
                key = R::STORAGE_KEY,
                %error,
                "failed to persist collection, keeping in-memory state"
            );
        }
    }

    fn ensure_new_id(&self, id: &str) -> WardResult<()> {
        if self.get(id).is_some() {
            return Err(WardError::DuplicateId {
                collection: R::STORAGE_KEY,
                id: id.to_owned(),
            });
        }
        Ok(())
    }
}

fn fallback<R: Record>(seed: SeedPolicy) -> Vec<R> {
    match seed {
        SeedPolicy::Demo => R::seed(),
        SeedPolicy::Empty => Vec::new(),
    }
}

/// Parses a stored JSON array, reporting the path of the first offending field.
fn parse_records<R: DeserializeOwned>(text: &str) -> Result<Vec<R>, String> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    let records = serde_path_to_error::deserialize::<_, Vec<R>>(&mut deserializer).map_err(
        |err| {
            let path = err.path().to_string();
            let path = if path.is_empty() || path == "." {
                "<root>".to_string()
            } else {
                path
            };
            format!("schema mismatch at {path}: {}", err.into_inner())
        },
    )?;
    deserializer.end().map_err(|e| e.to_string())?;
    Ok(records)
}

/// Parses embedded seed JSON. Seeds ship with the crate, so a failure is logged and yields
/// no records.
pub(crate) fn parse_seed<R: Record>(text: &str) -> Vec<R> {
    parse_records(text).unwrap_or_else(|reason| {
        tracing::warn!(key = R::STORAGE_KEY, %reason, "embedded seed data is malformed");
        Vec::new()
    })
}
