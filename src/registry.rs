//! Identity-keyed registries of shared catalog records.

use crate::structs::{Area, Course, Person};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Canonical instances of `T`, one per identity key.
pub struct Registry<T> {
    label: &'static str,
    entries: Mutex<HashMap<String, Arc<T>>>,
}

impl<T> Registry<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A panic while holding the lock cannot leave the map half-updated.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entries().get(key).cloned()
    }

    /// Returns the registered instance for `key`, building and registering one if there is none.
    ///
    /// `build` only runs on a miss.
    pub fn get_or_create<F>(&self, key: &str, build: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        let mut entries = self.entries();
        if let Some(existing) = entries.get(key) {
            debug!("{} registry hit for {key}", self.label);
            return Arc::clone(existing);
        }
        let created = Arc::new(build());
        entries.insert(key.to_owned(), Arc::clone(&created));
        created
    }

    /// Registers `value` unless `key` is already taken; returns whichever instance is canonical.
    pub fn insert(&self, key: &str, value: T) -> Arc<T> {
        self.get_or_create(key, || value)
    }

    pub fn remove(&self, key: &str) -> Option<Arc<T>> {
        self.entries().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

/// The registries one client resolves identities against.
pub struct Registries {
    pub courses: Registry<Course>,
    pub persons: Registry<Person>,
    pub areas: Registry<Area>,
}

impl Registries {
    pub fn new() -> Self {
        Self {
            courses: Registry::new("course"),
            persons: Registry::new("person"),
            areas: Registry::new("area"),
        }
    }

    pub fn clear(&self) {
        self.courses.clear();
        self.persons.clear();
        self.areas.clear();
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry key for a course code: trimmed and upper-cased.
pub fn course_key(code: &str) -> String {
    code.trim().to_uppercase()
}
