//! Key operations
//!
//! Commands that apply to a key whatever kind of value it holds.

use std::time::Duration;

use crate::error::{KvError, Result};
use super::{encode_each, skip_empty, SharedConnection, SharedSerializer};

/// Remaining lifetime of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// The key does not exist
    Missing,

    /// The key exists and has no timeout
    Persistent,

    /// The key expires after this long
    Expires(Duration),
}

impl Ttl {
    /// Interpret a raw `TTL` reply (seconds)
    pub fn from_seconds(raw: i64) -> Result<Self> {
        Self::from_raw("TTL", raw, Duration::from_secs)
    }

    /// Interpret a raw `PTTL` reply (milliseconds)
    pub fn from_millis(raw: i64) -> Result<Self> {
        Self::from_raw("PTTL", raw, Duration::from_millis)
    }

    fn from_raw(command: &str, raw: i64, unit: fn(u64) -> Duration) -> Result<Self> {
        match raw {
            -2 => Ok(Ttl::Missing),
            -1 => Ok(Ttl::Persistent),
            n if n >= 0 => Ok(Ttl::Expires(unit(n.unsigned_abs()))),
            n => Err(KvError::Protocol(format!(
                "{}: expected -2, -1 or a non-negative lifetime, got {}",
                command, n
            ))),
        }
    }

    /// Time left before expiry, if the key has a timeout
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Ttl::Expires(left) => Some(*left),
            _ => None,
        }
    }

    /// Whether the key existed when the TTL was read
    pub fn key_exists(&self) -> bool {
        !matches!(self, Ttl::Missing)
    }
}

/// Whole-key commands for keys of type `K`
pub struct KeyOperations<K> {
    connection: SharedConnection,
    keys: SharedSerializer<K>,
}

impl<K> KeyOperations<K> {
    pub(crate) fn new(connection: SharedConnection, keys: SharedSerializer<K>) -> Self {
        Self { connection, keys }
    }

    pub fn exists(&self, key: &K) -> Result<bool> {
        let key = self.keys.serialize(key)?;
        self.connection.exists(&key)
    }

    /// Delete every listed key in one command; returns how many existed
    pub fn delete(&self, keys: &[K]) -> Result<u64> {
        if keys.is_empty() {
            skip_empty("delete");
            return Ok(0);
        }
        let keys = encode_each(self.keys.as_ref(), keys)?;
        self.connection.del(&keys)
    }

    /// Set a timeout in whole seconds (sub-second parts are dropped)
    ///
    /// A zero timeout deletes the key. Returns false if the key is absent.
    pub fn expire(&self, key: &K, timeout: Duration) -> Result<bool> {
        let key = self.keys.serialize(key)?;
        let seconds = i64::try_from(timeout.as_secs()).unwrap_or(i64::MAX);
        self.connection.expire(&key, seconds)
    }

    /// Set a timeout with millisecond precision
    pub fn pexpire(&self, key: &K, timeout: Duration) -> Result<bool> {
        let key = self.keys.serialize(key)?;
        let millis = i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX);
        self.connection.pexpire(&key, millis)
    }

    /// Remove the timeout; returns false if there was none or the key is absent
    pub fn persist(&self, key: &K) -> Result<bool> {
        let key = self.keys.serialize(key)?;
        self.connection.persist(&key)
    }

    pub fn ttl(&self, key: &K) -> Result<Ttl> {
        let key = self.keys.serialize(key)?;
        Ttl::from_seconds(self.connection.ttl(&key)?)
    }

    pub fn pttl(&self, key: &K) -> Result<Ttl> {
        let key = self.keys.serialize(key)?;
        Ttl::from_millis(self.connection.pttl(&key)?)
    }
}
