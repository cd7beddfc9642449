//! Sorted set operations
//!
//! Members are ordered by score, ties broken by the member's encoded bytes.
//! Index ranges are inclusive with -1 as the last element; score windows
//! are inclusive and accept the infinities.

use crate::buffer::Buffer;
use crate::connection::Order;
use crate::error::Result;
use super::{
    decode_each, decode_scored, encode_each, skip_empty, SharedConnection, SharedSerializer,
};

/// Sorted set commands for keys `K` holding members `V`
pub struct ZSetOperations<K, V> {
    connection: SharedConnection,
    keys: SharedSerializer<K>,
    members: SharedSerializer<V>,
}

impl<K, V> ZSetOperations<K, V> {
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

    /// Add or rescore one member; returns true if it is new
    pub fn add(&self, key: &K, member: &V, score: f64) -> Result<bool> {
        let key = self.keys.serialize(key)?;
        let member = self.members.serialize(member)?;
        Ok(self.connection.zadd(&key, &[(member, score)])? > 0)
    }

    /// Add or rescore every member in one command; returns how many are new
    pub fn add_all(&self, key: &K, members: &[(V, f64)]) -> Result<u64> {
        if members.is_empty() {
            skip_empty("zset add_all");
            return Ok(0);
        }
        let key = self.keys.serialize(key)?;
        let members = members
            .iter()
            .map(|(member, score)| Ok((self.members.serialize(member)?, *score)))
            .collect::<Result<Vec<(Buffer, f64)>>>()?;
        self.connection.zadd(&key, &members)
    }

    pub fn remove(&self, key: &K, members: &[V]) -> Result<u64> {
        if members.is_empty() {
            skip_empty("zset remove");
            return Ok(0);
        }
        let key = self.keys.serialize(key)?;
        let members = encode_each(self.members.as_ref(), members)?;
        self.connection.zrem(&key, &members)
    }

    /// Add `delta` to the member's score (absent members start at 0)
    pub fn increment_score(&self, key: &K, member: &V, delta: f64) -> Result<f64> {
        let key = self.keys.serialize(key)?;
        let member = self.members.serialize(member)?;
        self.connection.zincrby(&key, delta, &member)
    }

    pub fn score(&self, key: &K, member: &V) -> Result<Option<f64>> {
        let key = self.keys.serialize(key)?;
        let member = self.members.serialize(member)?;
        self.connection.zscore(&key, &member)
    }

    /// 0-based position by ascending score
    pub fn rank(&self, key: &K, member: &V) -> Result<Option<u64>> {
        let key = self.keys.serialize(key)?;
        let member = self.members.serialize(member)?;
        self.connection.zrank(&key, &member)
    }

    /// 0-based position by descending score
    pub fn reverse_rank(&self, key: &K, member: &V) -> Result<Option<u64>> {
        let key = self.keys.serialize(key)?;
        let member = self.members.serialize(member)?;
        self.connection.zrevrank(&key, &member)
    }

    pub fn range(&self, key: &K, start: i64, stop: i64, order: Order) -> Result<Vec<V>> {
        let key = self.keys.serialize(key)?;
        decode_each(
            self.members.as_ref(),
            self.connection.zrange(&key, start, stop, order)?,
        )
    }

    pub fn range_with_scores(
        &self,
        key: &K,
        start: i64,
        stop: i64,
        order: Order,
    ) -> Result<Vec<(V, f64)>> {
        let key = self.keys.serialize(key)?;
        decode_scored(
            self.members.as_ref(),
            self.connection.zrange_with_scores(&key, start, stop, order)?,
        )
    }

    /// Members with `min <= score <= max`
    pub fn range_by_score(&self, key: &K, min: f64, max: f64, order: Order) -> Result<Vec<V>> {
        let key = self.keys.serialize(key)?;
        decode_each(
            self.members.as_ref(),
            self.connection.zrange_by_score(&key, min, max, order)?,
        )
    }

    pub fn range_by_score_with_scores(
        &self,
        key: &K,
        min: f64,
        max: f64,
        order: Order,
    ) -> Result<Vec<(V, f64)>> {
        let key = self.keys.serialize(key)?;
        decode_scored(
            self.members.as_ref(),
            self.connection
                .zrange_by_score_with_scores(&key, min, max, order)?,
        )
    }

    /// Number of members
    pub fn size(&self, key: &K) -> Result<u64> {
        let key = self.keys.serialize(key)?;
        self.connection.zcard(&key)
    }
}
