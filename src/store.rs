//! Store Module
//!
//! The one piece of shared mutable state: a map from byte-string keys to
//! protocol values.
//!
//! ## Concurrency
//! The map sits behind a single `parking_lot::RwLock`. Each operation takes
//! the lock exactly once and holds it for its whole duration, so a multi-key
//! `mset` or a `flush` is never observed half-applied. Readers (`get`,
//! `mget`) share the lock; writers are exclusive.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::protocol::Message;

/// In-memory key-value store shared by every connection
#[derive(Debug, Default)]
pub struct Store {
    data: RwLock<HashMap<Bytes, Message>>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `key`, if any
    pub fn get(&self, key: &[u8]) -> Option<Message> {
        self.data.read().get(key).cloned()
    }

    /// Insert or overwrite; always acknowledges one write
    pub fn set(&self, key: Bytes, value: Message) -> i64 {
        self.data.write().insert(key, value);
        1
    }

    /// 1 if the key existed and was removed, else 0
    pub fn delete(&self, key: &[u8]) -> i64 {
        match self.data.write().remove(key) {
            Some(_) => 1,
            None => 0,
        }
    }

    /// Remove every entry, returning how many there were
    pub fn flush(&self) -> i64 {
        let mut data = self.data.write();
        let removed = data.len();
        data.clear();
        removed as i64
    }

    /// One result per key, same order, duplicates resolved independently
    pub fn mget(&self, keys: &[Bytes]) -> Vec<Option<Message>> {
        let data = self.data.read();
        keys.iter().map(|key| data.get(key).cloned()).collect()
    }

    /// Apply pairs left to right under one lock; returns pairs written
    pub fn mset(&self, pairs: Vec<(Bytes, Message)>) -> i64 {
        let written = pairs.len();
        let mut data = self.data.write();
        for (key, value) in pairs {
            data.insert(key, value);
        }
        written as i64
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True when no entries are live
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}
