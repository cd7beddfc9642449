//! Set operations

use crate::error::Result;
use super::{
    decode_each, decode_optional, encode_each, skip_empty, SharedConnection, SharedSerializer,
};

/// Unordered set commands for keys `K` holding members `V`
pub struct SetOperations<K, V> {
    connection: SharedConnection,
    keys: SharedSerializer<K>,
    members: SharedSerializer<V>,
}

impl<K, V> SetOperations<K, V> {
    pub(crate) fn new(
        connection: SharedConnection,
        keys: SharedSerializer<K>,
        members: SharedSerializer<V>,
    ) -> Self {
        Self {
            connection,
            keys,
            members,
        }
    }

    /// Add `members`; returns how many were not already present
    ///
    /// Duplicates within `members` count once.
    pub fn add(&self, key: &K, members: &[V]) -> Result<u64> {
        if members.is_empty() {
            skip_empty("set add");
            return Ok(0);
        }
        let key = self.keys.serialize(key)?;
        let members = encode_each(self.members.as_ref(), members)?;
        self.connection.sadd(&key, &members)
    }

    pub fn remove(&self, key: &K, members: &[V]) -> Result<u64> {
        if members.is_empty() {
            skip_empty("set remove");
            return Ok(0);
        }
        let key = self.keys.serialize(key)?;
        let members = encode_each(self.members.as_ref(), members)?;
        self.connection.srem(&key, &members)
    }

    pub fn is_member(&self, key: &K, member: &V) -> Result<bool> {
        let key = self.keys.serialize(key)?;
        let member = self.members.serialize(member)?;
        self.connection.sismember(&key, &member)
    }

    pub fn members(&self, key: &K) -> Result<Vec<V>> {
        let key = self.keys.serialize(key)?;
        decode_each(self.members.as_ref(), self.connection.smembers(&key)?)
    }

    pub fn size(&self, key: &K) -> Result<u64> {
        let key = self.keys.serialize(key)?;
        self.connection.scard(&key)
    }

    /// Remove and return a random member
    pub fn pop(&self, key: &K) -> Result<Option<V>> {
        let key = self.keys.serialize(key)?;
        decode_optional(self.members.as_ref(), self.connection.spop(&key)?)
    }

    /// Members present in every listed set
    pub fn intersect(&self, keys: &[K]) -> Result<Vec<V>> {
        if keys.is_empty() {
            skip_empty("intersect");
            return Ok(Vec::new());
        }
        let keys = encode_each(self.keys.as_ref(), keys)?;
        decode_each(self.members.as_ref(), self.connection.sinter(&keys)?)
    }

    /// Members present in any listed set
    pub fn union(&self, keys: &[K]) -> Result<Vec<V>> {
        if keys.is_empty() {
            skip_empty("union");
            return Ok(Vec::new());
        }
        let keys = encode_each(self.keys.as_ref(), keys)?;
        decode_each(self.members.as_ref(), self.connection.sunion(&keys)?)
    }
}
