//! List operations

use crate::error::Result;
use super::{
    decode_each, decode_optional, encode_each, skip_empty, SharedConnection, SharedSerializer,
};

/// List commands for keys `K` holding elements `V`
///
/// Single and batch pushes use the same primitive, so pushing N values is
/// always one command. Pushes return the list length after the push.
pub struct ListOperations<K, V> {
    connection: SharedConnection,
    keys: SharedSerializer<K>,
    values: SharedSerializer<V>,
}

impl<K, V> ListOperations<K, V> {
    pub(crate) fn new(
        connection: SharedConnection,
        keys: SharedSerializer<K>,
        values: SharedSerializer<V>,
    ) -> Self {
        Self {
            connection,
            keys,
            values,
        }
    }

    pub fn left_push(&self, key: &K, value: &V) -> Result<u64> {
        let key = self.keys.serialize(key)?;
        let value = self.values.serialize(value)?;
        self.connection.lpush(&key, &[value])
    }

    /// Push each value onto the head in turn, so the last one ends up first
    pub fn left_push_all(&self, key: &K, values: &[V]) -> Result<u64> {
        if values.is_empty() {
            skip_empty("left_push_all");
            return Ok(0);
        }
        let key = self.keys.serialize(key)?;
        let values = encode_each(self.values.as_ref(), values)?;
        self.connection.lpush(&key, &values)
    }

    pub fn right_push(&self, key: &K, value: &V) -> Result<u64> {
        let key = self.keys.serialize(key)?;
        let value = self.values.serialize(value)?;
        self.connection.rpush(&key, &[value])
    }

    pub fn right_push_all(&self, key: &K, values: &[V]) -> Result<u64> {
        if values.is_empty() {
            skip_empty("right_push_all");
            return Ok(0);
        }
        let key = self.keys.serialize(key)?;
        let values = encode_each(self.values.as_ref(), values)?;
        self.connection.rpush(&key, &values)
    }

    pub fn left_pop(&self, key: &K) -> Result<Option<V>> {
        let key = self.keys.serialize(key)?;
        decode_optional(self.values.as_ref(), self.connection.lpop(&key)?)
    }

    pub fn right_pop(&self, key: &K) -> Result<Option<V>> {
        let key = self.keys.serialize(key)?;
        decode_optional(self.values.as_ref(), self.connection.rpop(&key)?)
    }

    /// Elements from `start` to `stop` inclusive; -1 is the last element
    pub fn range(&self, key: &K, start: i64, stop: i64) -> Result<Vec<V>> {
        let key = self.keys.serialize(key)?;
        decode_each(self.values.as_ref(), self.connection.lrange(&key, start, stop)?)
    }

    pub fn size(&self, key: &K) -> Result<u64> {
        let key = self.keys.serialize(key)?;
        self.connection.llen(&key)
    }

    pub fn index(&self, key: &K, index: i64) -> Result<Option<V>> {
        let key = self.keys.serialize(key)?;
        decode_optional(self.values.as_ref(), self.connection.lindex(&key, index)?)
    }

    /// Remove up to `count` occurrences of `value`
    ///
    /// A positive count scans from the head, a negative one from the tail,
    /// and zero removes every occurrence.
    pub fn remove(&self, key: &K, count: i64, value: &V) -> Result<u64> {
        let key = self.keys.serialize(key)?;
        let value = self.values.serialize(value)?;
        self.connection.lrem(&key, count, &value)
    }
}
