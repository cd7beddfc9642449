//! Memory Connection
//!
//! An in-process keyspace with the store's command semantics.
//!
//! ## Semantics
//! - Each key holds one kind of value (string, hash, list, set, sorted set);
//!   using a command of another family is a `WRONGTYPE` server error.
//! - Expired keys are removed lazily, when a command next touches them.
//! - A hash, list, set or sorted set that becomes empty is removed, so the
//!   key stops existing.
//! - Commands given an empty argument list fail with the store's arity
//!   error, exactly as they would over the wire.
//!
//! ```text
//!   Connection call ──► run(name) ──► lock keyspace ──► apply ──► unlock
//!                         │
//!                         └── commands_executed += 1
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::seq::IteratorRandom;

use crate::buffer::Buffer;
use crate::error::{KvError, Result};
use super::{Connection, Order};

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";
const NOT_AN_INTEGER: &str = "ERR value is not an integer or out of range";
const OVERFLOW: &str = "ERR increment or decrement would overflow";
const NOT_A_FLOAT: &str = "ERR value is not a valid float";
const SCORE_NAN: &str = "ERR resulting score is not a number (NaN)";

// =============================================================================
// Stored Values
// =============================================================================

enum Value {
    Str(Buffer),
    Hash(BTreeMap<Buffer, Buffer>),
    List(VecDeque<Buffer>),
    Set(BTreeSet<Buffer>),
    ZSet(HashMap<Buffer, f64>),
}

impl Value {
    fn is_empty_aggregate(&self) -> bool {
        match self {
            Value::Str(_) => false,
            Value::Hash(hash) => hash.is_empty(),
            Value::List(list) => list.is_empty(),
            Value::Set(set) => set.is_empty(),
            Value::ZSet(zset) => zset.is_empty(),
        }
    }
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

/// A concrete payload type one key can hold
trait Stored: Default {
    fn from_value(value: &mut Value) -> Option<&mut Self>;
    fn into_value(self) -> Value;
}

impl Stored for Buffer {
    fn from_value(value: &mut Value) -> Option<&mut Self> {
        match value {
            Value::Str(data) => Some(data),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl Stored for BTreeMap<Buffer, Buffer> {
    fn from_value(value: &mut Value) -> Option<&mut Self> {
        match value {
            Value::Hash(hash) => Some(hash),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Hash(self)
    }
}

impl Stored for VecDeque<Buffer> {
    fn from_value(value: &mut Value) -> Option<&mut Self> {
        match value {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::List(self)
    }
}

impl Stored for BTreeSet<Buffer> {
    fn from_value(value: &mut Value) -> Option<&mut Self> {
        match value {
            Value::Set(set) => Some(set),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Set(self)
    }
}

impl Stored for HashMap<Buffer, f64> {
    fn from_value(value: &mut Value) -> Option<&mut Self> {
        match value {
            Value::ZSet(zset) => Some(zset),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::ZSet(self)
    }
}

// =============================================================================
// Keyspace
// =============================================================================

#[derive(Default)]
struct Keyspace {
    entries: HashMap<Buffer, Entry>,
}

impl Keyspace {
    /// The entry under `key`, dropping it first if it has expired
    fn live(&mut self, key: &Buffer) -> Option<&mut Entry> {
        let now = Instant::now();
        if self.entries.get(key).map_or(false, |entry| entry.is_expired(now)) {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    /// Typed access to an existing key
    fn get<T: Stored>(&mut self, key: &Buffer) -> Result<Option<&mut T>> {
        match self.live(key) {
            None => Ok(None),
            Some(entry) => T::from_value(&mut entry.value)
                .map(Some)
                .ok_or_else(|| server(WRONG_TYPE)),
        }
    }

    /// Typed access, creating an empty value when the key is absent
    fn get_or_create<T: Stored>(&mut self, key: &Buffer) -> Result<&mut T> {
        if self.live(key).is_none() {
            self.entries
                .insert(key.clone(), Entry::new(T::default().into_value()));
        }
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| server("ERR no such key"))?;
        T::from_value(&mut entry.value).ok_or_else(|| server(WRONG_TYPE))
    }

    /// Remove `key` if it holds an aggregate that is now empty
    fn drop_if_empty(&mut self, key: &Buffer) {
        if self
            .entries
            .get(key)
            .map_or(false, |entry| entry.value.is_empty_aggregate())
        {
            self.entries.remove(key);
        }
    }

    /// Replace the string under `key`, keeping any timeout
    fn overwrite_string(&mut self, key: &Buffer, data: Buffer) -> Result<()> {
        *self.get_or_create::<Buffer>(key)? = data;
        Ok(())
    }

    fn add_integer(&mut self, key: &Buffer, delta: i64) -> Result<i64> {
        let current = match self.get::<Buffer>(key)? {
            Some(data) => parse_integer(data)?,
            None => 0,
        };
        let next = current.checked_add(delta).ok_or_else(|| server(OVERFLOW))?;
        self.overwrite_string(key, Buffer::from(next.to_string()))?;
        Ok(next)
    }

    fn set_expiry(&mut self, key: &Buffer, millis: i64) -> Result<bool> {
        if self.live(key).is_none() {
            return Ok(false);
        }
        if millis <= 0 {
            self.entries.remove(key);
            return Ok(true);
        }

        let deadline = Instant::now()
            .checked_add(Duration::from_millis(millis.unsigned_abs()))
            .ok_or_else(|| server("ERR invalid expire time"))?;
        if let Some(entry) = self.entries.get_mut(key) {
            entry.expires_at = Some(deadline);
        }
        Ok(true)
    }

    /// Remaining lifetime in milliseconds, or the -1 / -2 markers
    fn remaining_millis(&mut self, key: &Buffer) -> i64 {
        match self.live(key) {
            None => -2,
            Some(Entry {
                expires_at: None, ..
            }) => -1,
            Some(Entry {
                expires_at: Some(at),
                ..
            }) => {
                let left = at.saturating_duration_since(Instant::now());
                i64::try_from(left.as_millis()).unwrap_or(i64::MAX)
            }
        }
    }

    fn sorted_set(&mut self, key: &Buffer, order: Order) -> Result<Vec<(Buffer, f64)>> {
        let mut members: Vec<(Buffer, f64)> = match self.get::<HashMap<Buffer, f64>>(key)? {
            Some(zset) => zset.iter().map(|(m, s)| (m.clone(), *s)).collect(),
            None => Vec::new(),
        };
        members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        if order == Order::Descending {
            members.reverse();
        }
        Ok(members)
    }

    /// Snapshot of every set named in `keys`; absent keys read as empty
    fn sets(&mut self, keys: &[Buffer]) -> Result<Vec<BTreeSet<Buffer>>> {
        keys.iter()
            .map(|key| {
                Ok(self
                    .get::<BTreeSet<Buffer>>(key)?
                    .map(|set| set.clone())
                    .unwrap_or_default())
            })
            .collect()
    }
}

// =============================================================================
// Memory Connection
// =============================================================================

/// In-process store implementing [`Connection`]
///
/// Every trait call counts as one executed command, including calls the
/// store rejects, which makes round trips observable in tests.
#[derive(Default)]
pub struct MemoryConnection {
    keyspace: Mutex<Keyspace>,
    commands: AtomicU64,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands executed so far
    pub fn commands_executed(&self) -> u64 {
        self.commands.load(Ordering::Relaxed)
    }

    /// Drop every key. Not counted as a command.
    pub fn flush_all(&self) {
        self.keyspace.lock().entries.clear();
    }

    /// Number of live keys. Not counted as a command.
    pub fn key_count(&self) -> usize {
        let now = Instant::now();
        let mut keyspace = self.keyspace.lock();
        keyspace.entries.retain(|_, entry| !entry.is_expired(now));
        keyspace.entries.len()
    }

    fn run<T>(&self, command: &str, apply: impl FnOnce(&mut Keyspace) -> Result<T>) -> Result<T> {
        self.commands.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("Executing {} in memory", command);

        let mut keyspace = self.keyspace.lock();
        apply(&mut keyspace)
    }
}

fn server(message: &str) -> KvError {
    KvError::Server(message.to_string())
}

fn require_args<T>(command: &str, args: &[T]) -> Result<()> {
    if args.is_empty() {
        return Err(KvError::Server(format!(
            "ERR wrong number of arguments for '{}' command",
            command.to_lowercase()
        )));
    }
    Ok(())
}

fn parse_integer(data: &Buffer) -> Result<i64> {
    data.as_str()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(|| server(NOT_AN_INTEGER))
}

/// Clamp an inclusive `[start, stop]` range with negative indexes to `len`
fn normalize_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };

    if start >= len || start > stop {
        return None;
    }
    Some((start as usize, stop as usize))
}

fn slice_range<T: Clone>(items: &[T], start: i64, stop: i64) -> Vec<T> {
    match normalize_range(items.len(), start, stop) {
        Some((first, last)) => items[first..=last].to_vec(),
        None => Vec::new(),
    }
}

impl Connection for MemoryConnection {
    // -------------------------------------------------------------------------
    // Keys
    // -------------------------------------------------------------------------

    fn exists(&self, key: &Buffer) -> Result<bool> {
        self.run("EXISTS", |ks| Ok(ks.live(key).is_some()))
    }

    fn del(&self, keys: &[Buffer]) -> Result<u64> {
        self.run("DEL", |ks| {
            require_args("DEL", keys)?;
            let mut removed = 0;
            for key in keys {
                if ks.live(key).is_some() {
                    ks.entries.remove(key);
                    removed += 1;
                }
            }
            Ok(removed)
        })
    }

    fn expire(&self, key: &Buffer, seconds: i64) -> Result<bool> {
        self.run("EXPIRE", |ks| ks.set_expiry(key, seconds.saturating_mul(1000)))
    }

    fn pexpire(&self, key: &Buffer, millis: i64) -> Result<bool> {
        self.run("PEXPIRE", |ks| ks.set_expiry(key, millis))
    }

    fn persist(&self, key: &Buffer) -> Result<bool> {
        self.run("PERSIST", |ks| {
            Ok(match ks.live(key) {
                Some(entry) => entry.expires_at.take().is_some(),
                None => false,
            })
        })
    }

    fn ttl(&self, key: &Buffer) -> Result<i64> {
        self.run("TTL", |ks| {
            let millis = ks.remaining_millis(key);
            if millis < 0 {
                return Ok(millis);
            }
            Ok((millis + 500) / 1000)
        })
    }

    fn pttl(&self, key: &Buffer) -> Result<i64> {
        self.run("PTTL", |ks| Ok(ks.remaining_millis(key)))
    }

    // -------------------------------------------------------------------------
    // Strings
    // -------------------------------------------------------------------------

    fn set(&self, key: &Buffer, value: &Buffer) -> Result<()> {
        self.run("SET", |ks| {
            ks.entries
                .insert(key.clone(), Entry::new(Value::Str(value.clone())));
            Ok(())
        })
    }

    fn set_nx(&self, key: &Buffer, value: &Buffer) -> Result<bool> {
        self.run("SET", |ks| {
            if ks.live(key).is_some() {
                return Ok(false);
            }
            ks.entries
                .insert(key.clone(), Entry::new(Value::Str(value.clone())));
            Ok(true)
        })
    }

    fn set_ex(&self, key: &Buffer, value: &Buffer, seconds: u64) -> Result<()> {
        self.run("SET", |ks| {
            if seconds == 0 {
                return Err(server("ERR invalid expire time in 'set' command"));
            }
            let deadline = Instant::now()
                .checked_add(Duration::from_secs(seconds))
                .ok_or_else(|| server("ERR invalid expire time in 'set' command"))?;
            ks.entries.insert(
                key.clone(),
                Entry {
                    value: Value::Str(value.clone()),
                    expires_at: Some(deadline),
                },
            );
            Ok(())
        })
    }

    fn get(&self, key: &Buffer) -> Result<Option<Buffer>> {
        self.run("GET", |ks| Ok(ks.get::<Buffer>(key)?.map(|data| data.clone())))
    }

    fn getset(&self, key: &Buffer, value: &Buffer) -> Result<Option<Buffer>> {
        self.run("GETSET", |ks| {
            let previous = ks.get::<Buffer>(key)?.map(|data| data.clone());
            ks.entries
                .insert(key.clone(), Entry::new(Value::Str(value.clone())));
            Ok(previous)
        })
    }

    fn mget(&self, keys: &[Buffer]) -> Result<Vec<Option<Buffer>>> {
        self.run("MGET", |ks| {
            require_args("MGET", keys)?;
            // Keys of another type read as nil rather than failing the batch
            Ok(keys
                .iter()
                .map(|key| match ks.live(key) {
                    Some(Entry {
                        value: Value::Str(data),
                        ..
                    }) => Some(data.clone()),
                    _ => None,
                })
                .collect())
        })
    }

    fn incr_by(&self, key: &Buffer, delta: i64) -> Result<i64> {
        self.run("INCRBY", |ks| ks.add_integer(key, delta))
    }

    fn decr_by(&self, key: &Buffer, delta: i64) -> Result<i64> {
        self.run("DECRBY", |ks| {
            let delta = delta.checked_neg().ok_or_else(|| server(OVERFLOW))?;
            ks.add_integer(key, delta)
        })
    }

    fn append(&self, key: &Buffer, value: &Buffer) -> Result<u64> {
        self.run("APPEND", |ks| {
            let current = ks.get_or_create::<Buffer>(key)?;
            let mut joined = Vec::with_capacity(current.len() + value.len());
            joined.extend_from_slice(current);
            joined.extend_from_slice(value);
            *current = Buffer::from(joined);
            Ok(current.len() as u64)
        })
    }

    fn strlen(&self, key: &Buffer) -> Result<u64> {
        self.run("STRLEN", |ks| {
            Ok(ks.get::<Buffer>(key)?.map_or(0, |data| data.len() as u64))
        })
    }

    // -------------------------------------------------------------------------
    // Hashes
    // -------------------------------------------------------------------------

    fn hget(&self, key: &Buffer, field: &Buffer) -> Result<Option<Buffer>> {
        self.run("HGET", |ks| {
            Ok(ks
                .get::<BTreeMap<Buffer, Buffer>>(key)?
                .and_then(|hash| hash.get(field).cloned()))
        })
    }

    fn hmget(&self, key: &Buffer, fields: &[Buffer]) -> Result<Vec<Option<Buffer>>> {
        self.run("HMGET", |ks| {
            require_args("HMGET", fields)?;
            Ok(match ks.get::<BTreeMap<Buffer, Buffer>>(key)? {
                Some(hash) => fields.iter().map(|field| hash.get(field).cloned()).collect(),
                None => vec![None; fields.len()],
            })
        })
    }

    fn hset(&self, key: &Buffer, field: &Buffer, value: &Buffer) -> Result<bool> {
        self.run("HSET", |ks| {
            let hash = ks.get_or_create::<BTreeMap<Buffer, Buffer>>(key)?;
            Ok(hash.insert(field.clone(), value.clone()).is_none())
        })
    }

    fn hset_multiple(&self, key: &Buffer, entries: &[(Buffer, Buffer)]) -> Result<u64> {
        self.run("HSET", |ks| {
            require_args("HSET", entries)?;
            let hash = ks.get_or_create::<BTreeMap<Buffer, Buffer>>(key)?;
            let mut created = 0;
            for (field, value) in entries {
                if hash.insert(field.clone(), value.clone()).is_none() {
                    created += 1;
                }
            }
            Ok(created)
        })
    }

    fn hgetall(&self, key: &Buffer) -> Result<Vec<(Buffer, Buffer)>> {
        self.run("HGETALL", |ks| {
            Ok(ks
                .get::<BTreeMap<Buffer, Buffer>>(key)?
                .map(|hash| hash.iter().map(|(f, v)| (f.clone(), v.clone())).collect())
                .unwrap_or_default())
        })
    }

    fn hkeys(&self, key: &Buffer) -> Result<Vec<Buffer>> {
        self.run("HKEYS", |ks| {
            Ok(ks
                .get::<BTreeMap<Buffer, Buffer>>(key)?
                .map(|hash| hash.keys().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn hvals(&self, key: &Buffer) -> Result<Vec<Buffer>> {
        self.run("HVALS", |ks| {
            Ok(ks
                .get::<BTreeMap<Buffer, Buffer>>(key)?
                .map(|hash| hash.values().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn hdel(&self, key: &Buffer, fields: &[Buffer]) -> Result<u64> {
        self.run("HDEL", |ks| {
            require_args("HDEL", fields)?;
            let removed = match ks.get::<BTreeMap<Buffer, Buffer>>(key)? {
                Some(hash) => fields
                    .iter()
                    .filter(|field| hash.remove(*field).is_some())
                    .count() as u64,
                None => 0,
            };
            ks.drop_if_empty(key);
            Ok(removed)
        })
    }

    fn hexists(&self, key: &Buffer, field: &Buffer) -> Result<bool> {
        self.run("HEXISTS", |ks| {
            Ok(ks
                .get::<BTreeMap<Buffer, Buffer>>(key)?
                .map_or(false, |hash| hash.contains_key(field)))
        })
    }

    fn hlen(&self, key: &Buffer) -> Result<u64> {
        self.run("HLEN", |ks| {
            Ok(ks
                .get::<BTreeMap<Buffer, Buffer>>(key)?
                .map_or(0, |hash| hash.len() as u64))
        })
    }

    // -------------------------------------------------------------------------
    // Lists
    // -------------------------------------------------------------------------

    fn lpush(&self, key: &Buffer, values: &[Buffer]) -> Result<u64> {
        self.run("LPUSH", |ks| {
            require_args("LPUSH", values)?;
            let list = ks.get_or_create::<VecDeque<Buffer>>(key)?;
            for value in values {
                list.push_front(value.clone());
            }
            Ok(list.len() as u64)
        })
    }

    fn rpush(&self, key: &Buffer, values: &[Buffer]) -> Result<u64> {
        self.run("RPUSH", |ks| {
            require_args("RPUSH", values)?;
            let list = ks.get_or_create::<VecDeque<Buffer>>(key)?;
            list.extend(values.iter().cloned());
            Ok(list.len() as u64)
        })
    }

    fn lpop(&self, key: &Buffer) -> Result<Option<Buffer>> {
        self.run("LPOP", |ks| {
            let popped = ks
                .get::<VecDeque<Buffer>>(key)?
                .and_then(|list| list.pop_front());
            ks.drop_if_empty(key);
            Ok(popped)
        })
    }

    fn rpop(&self, key: &Buffer) -> Result<Option<Buffer>> {
        self.run("RPOP", |ks| {
            let popped = ks
                .get::<VecDeque<Buffer>>(key)?
                .and_then(|list| list.pop_back());
            ks.drop_if_empty(key);
            Ok(popped)
        })
    }

    fn lrange(&self, key: &Buffer, start: i64, stop: i64) -> Result<Vec<Buffer>> {
        self.run("LRANGE", |ks| {
            Ok(match ks.get::<VecDeque<Buffer>>(key)? {
                Some(list) => slice_range(list.make_contiguous(), start, stop),
                None => Vec::new(),
            })
        })
    }

    fn llen(&self, key: &Buffer) -> Result<u64> {
        self.run("LLEN", |ks| {
            Ok(ks
                .get::<VecDeque<Buffer>>(key)?
                .map_or(0, |list| list.len() as u64))
        })
    }

    fn lindex(&self, key: &Buffer, index: i64) -> Result<Option<Buffer>> {
        self.run("LINDEX", |ks| {
            Ok(ks.get::<VecDeque<Buffer>>(key)?.and_then(|list| {
                let len = i64::try_from(list.len()).unwrap_or(i64::MAX);
                let index = if index < 0 { len + index } else { index };
                usize::try_from(index)
                    .ok()
                    .and_then(|i| list.get(i).cloned())
            }))
        })
    }

    fn lrem(&self, key: &Buffer, count: i64, value: &Buffer) -> Result<u64> {
        self.run("LREM", |ks| {
            let Some(list) = ks.get::<VecDeque<Buffer>>(key)? else {
                return Ok(0);
            };

            // 0 removes every match; the sign picks the end to start from
            let limit = if count == 0 {
                usize::MAX
            } else {
                usize::try_from(count.unsigned_abs()).unwrap_or(usize::MAX)
            };
            let mut removed = 0usize;
            if count >= 0 {
                let mut i = 0;
                while i < list.len() && removed < limit {
                    if list[i] == *value {
                        list.remove(i);
                        removed += 1;
                    } else {
                        i += 1;
                    }
                }
            } else {
                let mut i = list.len();
                while i > 0 && removed < limit {
                    i -= 1;
                    if list[i] == *value {
                        list.remove(i);
                        removed += 1;
                    }
                }
            }

            ks.drop_if_empty(key);
            Ok(removed as u64)
        })
    }

    // -------------------------------------------------------------------------
    // Sets
    // -------------------------------------------------------------------------

    fn sadd(&self, key: &Buffer, members: &[Buffer]) -> Result<u64> {
        self.run("SADD", |ks| {
            require_args("SADD", members)?;
            let set = ks.get_or_create::<BTreeSet<Buffer>>(key)?;
            Ok(members
                .iter()
                .filter(|member| set.insert((*member).clone()))
                .count() as u64)
        })
    }

    fn srem(&self, key: &Buffer, members: &[Buffer]) -> Result<u64> {
        self.run("SREM", |ks| {
            require_args("SREM", members)?;
            let removed = match ks.get::<BTreeSet<Buffer>>(key)? {
                Some(set) => members.iter().filter(|member| set.remove(*member)).count() as u64,
                None => 0,
            };
            ks.drop_if_empty(key);
            Ok(removed)
        })
    }

    fn sismember(&self, key: &Buffer, member: &Buffer) -> Result<bool> {
        self.run("SISMEMBER", |ks| {
            Ok(ks
                .get::<BTreeSet<Buffer>>(key)?
                .map_or(false, |set| set.contains(member)))
        })
    }

    fn smembers(&self, key: &Buffer) -> Result<Vec<Buffer>> {
        self.run("SMEMBERS", |ks| {
            Ok(ks
                .get::<BTreeSet<Buffer>>(key)?
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn scard(&self, key: &Buffer) -> Result<u64> {
        self.run("SCARD", |ks| {
            Ok(ks
                .get::<BTreeSet<Buffer>>(key)?
                .map_or(0, |set| set.len() as u64))
        })
    }

    fn spop(&self, key: &Buffer) -> Result<Option<Buffer>> {
        self.run("SPOP", |ks| {
            let popped = ks.get::<BTreeSet<Buffer>>(key)?.and_then(|set| {
                let chosen = set.iter().choose(&mut rand::thread_rng()).cloned()?;
                set.remove(&chosen);
                Some(chosen)
            });
            ks.drop_if_empty(key);
            Ok(popped)
        })
    }

    fn sinter(&self, keys: &[Buffer]) -> Result<Vec<Buffer>> {
        self.run("SINTER", |ks| {
            require_args("SINTER", keys)?;
            let mut sets = ks.sets(keys)?.into_iter();
            let first = sets.next().unwrap_or_default();
            let common = sets.fold(first, |acc, set| acc.intersection(&set).cloned().collect());
            Ok(common.into_iter().collect())
        })
    }

    fn sunion(&self, keys: &[Buffer]) -> Result<Vec<Buffer>> {
        self.run("SUNION", |ks| {
            require_args("SUNION", keys)?;
            let all: BTreeSet<Buffer> = ks.sets(keys)?.into_iter().flatten().collect();
            Ok(all.into_iter().collect())
        })
    }

    // -------------------------------------------------------------------------
    // Sorted Sets
    // -------------------------------------------------------------------------

    fn zadd(&self, key: &Buffer, members: &[(Buffer, f64)]) -> Result<u64> {
        self.run("ZADD", |ks| {
            require_args("ZADD", members)?;
            if members.iter().any(|(_, score)| score.is_nan()) {
                return Err(server(NOT_A_FLOAT));
            }
            let zset = ks.get_or_create::<HashMap<Buffer, f64>>(key)?;
            Ok(members
                .iter()
                .filter(|(member, score)| zset.insert(member.clone(), *score).is_none())
                .count() as u64)
        })
    }

    fn zrem(&self, key: &Buffer, members: &[Buffer]) -> Result<u64> {
        self.run("ZREM", |ks| {
            require_args("ZREM", members)?;
            let removed = match ks.get::<HashMap<Buffer, f64>>(key)? {
                Some(zset) => members
                    .iter()
                    .filter(|member| zset.remove(*member).is_some())
                    .count() as u64,
                None => 0,
            };
            ks.drop_if_empty(key);
            Ok(removed)
        })
    }

    fn zincrby(&self, key: &Buffer, increment: f64, member: &Buffer) -> Result<f64> {
        self.run("ZINCRBY", |ks| {
            if increment.is_nan() {
                return Err(server(NOT_A_FLOAT));
            }
            let zset = ks.get_or_create::<HashMap<Buffer, f64>>(key)?;
            let next = zset.get(member).copied().unwrap_or(0.0) + increment;
            if next.is_nan() {
                // inf + -inf; leave the member untouched
                ks.drop_if_empty(key);
                return Err(server(SCORE_NAN));
            }
            zset.insert(member.clone(), next);
            Ok(next)
        })
    }

    fn zscore(&self, key: &Buffer, member: &Buffer) -> Result<Option<f64>> {
        self.run("ZSCORE", |ks| {
            Ok(ks
                .get::<HashMap<Buffer, f64>>(key)?
                .and_then(|zset| zset.get(member).copied()))
        })
    }

    fn zrank(&self, key: &Buffer, member: &Buffer) -> Result<Option<u64>> {
        self.run("ZRANK", |ks| {
            let ranked = ks.sorted_set(key, Order::Ascending)?;
            Ok(ranked.iter().position(|(m, _)| m == member).map(|i| i as u64))
        })
    }

    fn zrevrank(&self, key: &Buffer, member: &Buffer) -> Result<Option<u64>> {
        self.run("ZREVRANK", |ks| {
            let ranked = ks.sorted_set(key, Order::Descending)?;
            Ok(ranked.iter().position(|(m, _)| m == member).map(|i| i as u64))
        })
    }

    fn zcard(&self, key: &Buffer) -> Result<u64> {
        self.run("ZCARD", |ks| {
            Ok(ks
                .get::<HashMap<Buffer, f64>>(key)?
                .map_or(0, |zset| zset.len() as u64))
        })
    }

    fn zrange(&self, key: &Buffer, start: i64, stop: i64, order: Order) -> Result<Vec<Buffer>> {
        Ok(self
            .zrange_with_scores(key, start, stop, order)?
            .into_iter()
            .map(|(member, _)| member)
            .collect())
    }

    fn zrange_with_scores(
        &self,
        key: &Buffer,
        start: i64,
        stop: i64,
        order: Order,
    ) -> Result<Vec<(Buffer, f64)>> {
        self.run("ZRANGE", |ks| {
            let ranked = ks.sorted_set(key, order)?;
            Ok(slice_range(&ranked, start, stop))
        })
    }

    fn zrange_by_score(
        &self,
        key: &Buffer,
        min: f64,
        max: f64,
        order: Order,
    ) -> Result<Vec<Buffer>> {
        Ok(self
            .zrange_by_score_with_scores(key, min, max, order)?
            .into_iter()
            .map(|(member, _)| member)
            .collect())
    }

    fn zrange_by_score_with_scores(
        &self,
        key: &Buffer,
        min: f64,
        max: f64,
        order: Order,
    ) -> Result<Vec<(Buffer, f64)>> {
        self.run("ZRANGEBYSCORE", |ks| {
            if min.is_nan() || max.is_nan() {
                return Err(server("ERR min or max is not a float"));
            }
            let ranked = ks.sorted_set(key, order)?;
            Ok(ranked
                .into_iter()
                .filter(|(_, score)| *score >= min && *score <= max)
                .collect())
        })
    }
}
