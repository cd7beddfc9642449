//! Hash operations
//!
//! Field names and field values have their own serializers, so a hash keyed
//! by `K` may map `HK` fields to `HV` values.

use crate::buffer::Buffer;
use crate::error::Result;
use super::{
    decode_aligned, decode_each, decode_optional, encode_each, skip_empty, SharedConnection,
    SharedSerializer,
};

/// Hash commands for keys `K`, fields `HK` and field values `HV`
pub struct HashOperations<K, HK, HV> {
    connection: SharedConnection,
    keys: SharedSerializer<K>,
    fields: SharedSerializer<HK>,
    values: SharedSerializer<HV>,
}

impl<K, HK, HV> HashOperations<K, HK, HV> {
    pub(crate) fn new(
        connection: SharedConnection,
        keys: SharedSerializer<K>,
        fields: SharedSerializer<HK>,
        values: SharedSerializer<HV>,
    ) -> Self {
        Self {
            connection,
            keys,
            fields,
            values,
        }
    }

    pub fn get(&self, key: &K, field: &HK) -> Result<Option<HV>> {
        let key = self.keys.serialize(key)?;
        let field = self.fields.serialize(field)?;
        decode_optional(self.values.as_ref(), self.connection.hget(&key, &field)?)
    }

    /// Values for `fields`, one entry per requested field in request order
    ///
    /// Unmatched fields are `None` in their position.
    pub fn multi_get(&self, key: &K, fields: &[HK]) -> Result<Vec<Option<HV>>> {
        if fields.is_empty() {
            skip_empty("hash multi_get");
            return Ok(Vec::new());
        }
        let key = self.keys.serialize(key)?;
        let fields = encode_each(self.fields.as_ref(), fields)?;
        decode_aligned(self.values.as_ref(), self.connection.hmget(&key, &fields)?)
    }

    /// Set one field; returns true if the field is new
    pub fn put(&self, key: &K, field: &HK, value: &HV) -> Result<bool> {
        let key = self.keys.serialize(key)?;
        let field = self.fields.serialize(field)?;
        let value = self.values.serialize(value)?;
        self.connection.hset(&key, &field, &value)
    }

    /// Set every entry in one command; returns how many fields are new
    pub fn put_all(&self, key: &K, entries: &[(HK, HV)]) -> Result<u64> {
        if entries.is_empty() {
            skip_empty("put_all");
            return Ok(0);
        }
        let key = self.keys.serialize(key)?;
        let entries = entries
            .iter()
            .map(|(field, value)| {
                Ok((self.fields.serialize(field)?, self.values.serialize(value)?))
            })
            .collect::<Result<Vec<(Buffer, Buffer)>>>()?;
        self.connection.hset_multiple(&key, &entries)
    }

    /// Every field with its value
    pub fn entries(&self, key: &K) -> Result<Vec<(HK, HV)>> {
        let key = self.keys.serialize(key)?;
        self.connection
            .hgetall(&key)?
            .iter()
            .map(|(field, value)| {
                Ok((self.fields.deserialize(field)?, self.values.deserialize(value)?))
            })
            .collect()
    }

    pub fn keys(&self, key: &K) -> Result<Vec<HK>> {
        let key = self.keys.serialize(key)?;
        decode_each(self.fields.as_ref(), self.connection.hkeys(&key)?)
    }

    pub fn values(&self, key: &K) -> Result<Vec<HV>> {
        let key = self.keys.serialize(key)?;
        decode_each(self.values.as_ref(), self.connection.hvals(&key)?)
    }

    /// Remove `fields`; returns how many existed
    pub fn delete(&self, key: &K, fields: &[HK]) -> Result<u64> {
        if fields.is_empty() {
            skip_empty("hash delete");
            return Ok(0);
        }
        let key = self.keys.serialize(key)?;
        let fields = encode_each(self.fields.as_ref(), fields)?;
        self.connection.hdel(&key, &fields)
    }

    pub fn has_key(&self, key: &K, field: &HK) -> Result<bool> {
        let key = self.keys.serialize(key)?;
        let field = self.fields.serialize(field)?;
        self.connection.hexists(&key, &field)
    }

    /// Number of fields
    pub fn size(&self, key: &K) -> Result<u64> {
        let key = self.keys.serialize(key)?;
        self.connection.hlen(&key)
    }
}
