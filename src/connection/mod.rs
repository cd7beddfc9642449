//! Connection Module
//!
//! The capability interface between the typed layer and a store client.
//!
//! ## Contract
//! - Every method is one blocking round trip: it returns once the store has
//!   replied.
//! - Arguments and replies are raw [`Buffer`]s and primitive numbers, never
//!   domain types.
//! - Absence is `None`, an empty collection or a zero count, never an error.
//! - A reply whose shape does not match the command is a
//!   [`KvError::Protocol`](crate::KvError::Protocol); an error reply from the
//!   store is a [`KvError::Server`](crate::KvError::Server).
//! - Batch primitives (slices of keys, fields, members or values) are a
//!   single command each.
//!
//! ## Implementations
//! - [`RespConnection`]: RESP2 over TCP
//! - [`MemoryConnection`]: in-process store with the same semantics

mod resp;
mod memory;

pub use resp::RespConnection;
pub use memory::MemoryConnection;

use crate::buffer::Buffer;
use crate::error::Result;

/// Direction of a sorted-set range query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Lowest score first
    #[default]
    Ascending,

    /// Highest score first
    Descending,
}

/// Primitive, buffer-level store commands
///
/// Implementations are shared as `Arc<dyn Connection>` by every template
/// bound to the same session, hence the `Send + Sync` bound. A single
/// connection carries one request at a time; concurrent callers are
/// serialized by the implementation or must use separate connections.
pub trait Connection: Send + Sync {
    // -------------------------------------------------------------------------
    // Keys
    // -------------------------------------------------------------------------

    /// `EXISTS key`
    fn exists(&self, key: &Buffer) -> Result<bool>;

    /// `DEL key [key ...]`, returns how many keys existed and were removed
    fn del(&self, keys: &[Buffer]) -> Result<u64>;

    /// `EXPIRE key seconds`, returns false if the key does not exist
    fn expire(&self, key: &Buffer, seconds: i64) -> Result<bool>;

    /// `PEXPIRE key milliseconds`
    fn pexpire(&self, key: &Buffer, millis: i64) -> Result<bool>;

    /// `PERSIST key`, returns false if the key had no timeout or is absent
    fn persist(&self, key: &Buffer) -> Result<bool>;

    /// `TTL key`: seconds remaining, -1 without expiry, -2 when absent
    fn ttl(&self, key: &Buffer) -> Result<i64>;

    /// `PTTL key`: like `ttl` in milliseconds
    fn pttl(&self, key: &Buffer) -> Result<i64>;

    // -------------------------------------------------------------------------
    // Strings
    // -------------------------------------------------------------------------

    /// `SET key value`
    fn set(&self, key: &Buffer, value: &Buffer) -> Result<()>;

    /// `SET key value NX`, returns whether the value was written
    fn set_nx(&self, key: &Buffer, value: &Buffer) -> Result<bool>;

    /// `SET key value EX seconds`
    fn set_ex(&self, key: &Buffer, value: &Buffer, seconds: u64) -> Result<()>;

    /// `GET key`
    fn get(&self, key: &Buffer) -> Result<Option<Buffer>>;

    /// `GETSET key value`, returns the previous value
    fn getset(&self, key: &Buffer, value: &Buffer) -> Result<Option<Buffer>>;

    /// `MGET key [key ...]`, one entry per requested key
    fn mget(&self, keys: &[Buffer]) -> Result<Vec<Option<Buffer>>>;

    /// `INCRBY key delta`, returns the new value
    fn incr_by(&self, key: &Buffer, delta: i64) -> Result<i64>;

    /// `DECRBY key delta`, returns the new value
    fn decr_by(&self, key: &Buffer, delta: i64) -> Result<i64>;

    /// `APPEND key value`, returns the resulting length
    fn append(&self, key: &Buffer, value: &Buffer) -> Result<u64>;

    /// `STRLEN key`
    fn strlen(&self, key: &Buffer) -> Result<u64>;

    // -------------------------------------------------------------------------
    // Hashes
    // -------------------------------------------------------------------------

    /// `HGET key field`
    fn hget(&self, key: &Buffer, field: &Buffer) -> Result<Option<Buffer>>;

    /// `HMGET key field [field ...]`, one entry per requested field, in order
    fn hmget(&self, key: &Buffer, fields: &[Buffer]) -> Result<Vec<Option<Buffer>>>;

    /// `HSET key field value`, returns true if the field is new
    fn hset(&self, key: &Buffer, field: &Buffer, value: &Buffer) -> Result<bool>;

    /// `HSET key field value [field value ...]`, returns how many fields are new
    fn hset_multiple(&self, key: &Buffer, entries: &[(Buffer, Buffer)]) -> Result<u64>;

    /// `HGETALL key`
    fn hgetall(&self, key: &Buffer) -> Result<Vec<(Buffer, Buffer)>>;

    /// `HKEYS key`
    fn hkeys(&self, key: &Buffer) -> Result<Vec<Buffer>>;

    /// `HVALS key`
    fn hvals(&self, key: &Buffer) -> Result<Vec<Buffer>>;

    /// `HDEL key field [field ...]`, returns how many fields were removed
    fn hdel(&self, key: &Buffer, fields: &[Buffer]) -> Result<u64>;

    /// `HEXISTS key field`
    fn hexists(&self, key: &Buffer, field: &Buffer) -> Result<bool>;

    /// `HLEN key`
    fn hlen(&self, key: &Buffer) -> Result<u64>;

    // -------------------------------------------------------------------------
    // Lists
    // -------------------------------------------------------------------------

    /// `LPUSH key value [value ...]`, returns the new length
    fn lpush(&self, key: &Buffer, values: &[Buffer]) -> Result<u64>;

    /// `RPUSH key value [value ...]`, returns the new length
    fn rpush(&self, key: &Buffer, values: &[Buffer]) -> Result<u64>;

    /// `LPOP key`
    fn lpop(&self, key: &Buffer) -> Result<Option<Buffer>>;

    /// `RPOP key`
    fn rpop(&self, key: &Buffer) -> Result<Option<Buffer>>;

    /// `LRANGE key start stop`, inclusive; negative indexes count from the end
    fn lrange(&self, key: &Buffer, start: i64, stop: i64) -> Result<Vec<Buffer>>;

    /// `LLEN key`
    fn llen(&self, key: &Buffer) -> Result<u64>;

    /// `LINDEX key index`
    fn lindex(&self, key: &Buffer, index: i64) -> Result<Option<Buffer>>;

    /// `LREM key count value`, returns how many elements were removed
    fn lrem(&self, key: &Buffer, count: i64, value: &Buffer) -> Result<u64>;

    // -------------------------------------------------------------------------
    // Sets
    // -------------------------------------------------------------------------

    /// `SADD key member [member ...]`, returns how many members are new
    fn sadd(&self, key: &Buffer, members: &[Buffer]) -> Result<u64>;

    /// `SREM key member [member ...]`, returns how many members were removed
    fn srem(&self, key: &Buffer, members: &[Buffer]) -> Result<u64>;

    /// `SISMEMBER key member`
    fn sismember(&self, key: &Buffer, member: &Buffer) -> Result<bool>;

    /// `SMEMBERS key`
    fn smembers(&self, key: &Buffer) -> Result<Vec<Buffer>>;

    /// `SCARD key`
    fn scard(&self, key: &Buffer) -> Result<u64>;

    /// `SPOP key`, removes and returns a random member
    fn spop(&self, key: &Buffer) -> Result<Option<Buffer>>;

    /// `SINTER key [key ...]`
    fn sinter(&self, keys: &[Buffer]) -> Result<Vec<Buffer>>;

    /// `SUNION key [key ...]`
    fn sunion(&self, keys: &[Buffer]) -> Result<Vec<Buffer>>;

    // -------------------------------------------------------------------------
    // Sorted Sets
    // -------------------------------------------------------------------------

    /// `ZADD key score member [score member ...]`, returns how many members
    /// are new; existing members have their score replaced
    fn zadd(&self, key: &Buffer, members: &[(Buffer, f64)]) -> Result<u64>;

    /// `ZREM key member [member ...]`
    fn zrem(&self, key: &Buffer, members: &[Buffer]) -> Result<u64>;

    /// `ZINCRBY key increment member`, returns the new score
    fn zincrby(&self, key: &Buffer, increment: f64, member: &Buffer) -> Result<f64>;

    /// `ZSCORE key member`
    fn zscore(&self, key: &Buffer, member: &Buffer) -> Result<Option<f64>>;

    /// `ZRANK key member`, 0-based position by ascending score
    fn zrank(&self, key: &Buffer, member: &Buffer) -> Result<Option<u64>>;

    /// `ZREVRANK key member`, 0-based position by descending score
    fn zrevrank(&self, key: &Buffer, member: &Buffer) -> Result<Option<u64>>;

    /// `ZCARD key`
    fn zcard(&self, key: &Buffer) -> Result<u64>;

    /// `ZRANGE` / `ZREVRANGE key start stop`
    fn zrange(&self, key: &Buffer, start: i64, stop: i64, order: Order) -> Result<Vec<Buffer>>;

    /// `ZRANGE` / `ZREVRANGE key start stop WITHSCORES`
    fn zrange_with_scores(
        &self,
        key: &Buffer,
        start: i64,
        stop: i64,
        order: Order,
    ) -> Result<Vec<(Buffer, f64)>>;

    /// `ZRANGEBYSCORE` / `ZREVRANGEBYSCORE`, inclusive `[min, max]` window
    fn zrange_by_score(&self, key: &Buffer, min: f64, max: f64, order: Order)
        -> Result<Vec<Buffer>>;

    /// `ZRANGEBYSCORE` / `ZREVRANGEBYSCORE ... WITHSCORES`
    fn zrange_by_score_with_scores(
        &self,
        key: &Buffer,
        min: f64,
        max: f64,
        order: Order,
    ) -> Result<Vec<(Buffer, f64)>>;
}
