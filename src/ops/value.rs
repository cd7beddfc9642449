//! Value (string) operations

use std::time::Duration;

use crate::error::Result;
use super::{
    decode_aligned, decode_optional, encode_each, skip_empty, SharedConnection, SharedSerializer,
};

/// Plain key/value commands for keys `K` holding values `V`
pub struct ValueOperations<K, V> {
    connection: SharedConnection,
    keys: SharedSerializer<K>,
    values: SharedSerializer<V>,
}

impl<K, V> ValueOperations<K, V> {
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

    /// Store `value`, replacing any previous value and timeout
    pub fn set(&self, key: &K, value: &V) -> Result<()> {
        let key = self.keys.serialize(key)?;
        let value = self.values.serialize(value)?;
        self.connection.set(&key, &value)
    }

    pub fn get(&self, key: &K) -> Result<Option<V>> {
        let key = self.keys.serialize(key)?;
        decode_optional(self.values.as_ref(), self.connection.get(&key)?)
    }

    /// Store `value` and return the value it replaced
    pub fn get_and_set(&self, key: &K, value: &V) -> Result<Option<V>> {
        let key = self.keys.serialize(key)?;
        let value = self.values.serialize(value)?;
        decode_optional(self.values.as_ref(), self.connection.getset(&key, &value)?)
    }

    /// Add `delta` to the integer stored at `key` (absent counts as 0)
    ///
    /// The stored value must be the decimal text of an integer, whatever
    /// serializer `V` uses; anything else is rejected by the store.
    pub fn increment(&self, key: &K, delta: i64) -> Result<i64> {
        let key = self.keys.serialize(key)?;
        self.connection.incr_by(&key, delta)
    }

    pub fn decrement(&self, key: &K, delta: i64) -> Result<i64> {
        let key = self.keys.serialize(key)?;
        self.connection.decr_by(&key, delta)
    }

    /// Append the encoded `value`; returns the resulting length in bytes
    pub fn append(&self, key: &K, value: &V) -> Result<u64> {
        let key = self.keys.serialize(key)?;
        let value = self.values.serialize(value)?;
        self.connection.append(&key, &value)
    }

    /// Store `value` only if `key` is absent; returns whether it was stored
    pub fn set_if_absent(&self, key: &K, value: &V) -> Result<bool> {
        let key = self.keys.serialize(key)?;
        let value = self.values.serialize(value)?;
        self.connection.set_nx(&key, &value)
    }

    /// Store `value` with a timeout in whole seconds
    ///
    /// The store rejects a timeout shorter than one second.
    pub fn set_with_expiry(&self, key: &K, value: &V, timeout: Duration) -> Result<()> {
        let key = self.keys.serialize(key)?;
        let value = self.values.serialize(value)?;
        self.connection.set_ex(&key, &value, timeout.as_secs())
    }

    /// One entry per requested key, in request order
    pub fn multi_get(&self, keys: &[K]) -> Result<Vec<Option<V>>> {
        if keys.is_empty() {
            skip_empty("multi_get");
            return Ok(Vec::new());
        }
        let keys = encode_each(self.keys.as_ref(), keys)?;
        decode_aligned(self.values.as_ref(), self.connection.mget(&keys)?)
    }

    /// Length of the stored payload in bytes
    pub fn size(&self, key: &K) -> Result<u64> {
        let key = self.keys.serialize(key)?;
        self.connection.strlen(&key)
    }
}
