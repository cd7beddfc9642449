//! Serde-backed serializers
//!
//! For structured types that have no canonical text form, or that need a
//! compact binary encoding.

use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::buffer::Buffer;
use crate::error::{KvError, Result};
use super::Serializer;

// =============================================================================
// Bincode
// =============================================================================

/// Compact binary encoding via `bincode`
///
/// Not lossy. Payloads are not self-describing: reading them back requires
/// the same type definition that wrote them.
pub struct BincodeSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> BincodeSerializer<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for BincodeSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BincodeSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BincodeSerializer<{}>", type_name::<T>())
    }
}

impl<T> Serializer<T> for BincodeSerializer<T>
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &T) -> Result<Buffer> {
        bincode::serialize(value)
            .map(Buffer::from)
            .map_err(|e| KvError::Encode(format!("{}: {}", type_name::<T>(), e)))
    }

    fn deserialize(&self, buffer: &Buffer) -> Result<T> {
        bincode::deserialize(buffer)
            .map_err(|e| KvError::Decode(format!("{}: {}", type_name::<T>(), e)))
    }
}

// =============================================================================
// JSON
// =============================================================================

/// JSON encoding via `serde_json`
///
/// ## Lossy Values
/// JSON has no representation for `NaN` or the infinities; `serde_json`
/// writes them as `null`, which then fails to decode back into a float.
/// Maps with non-string keys fail to encode.
pub struct JsonSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSerializer<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonSerializer<{}>", type_name::<T>())
    }
}

impl<T> Serializer<T> for JsonSerializer<T>
where
    T: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &T) -> Result<Buffer> {
        serde_json::to_vec(value)
            .map(Buffer::from)
            .map_err(|e| KvError::Encode(format!("{}: {}", type_name::<T>(), e)))
    }

    fn deserialize(&self, buffer: &Buffer) -> Result<T> {
        serde_json::from_slice(buffer)
            .map_err(|e| KvError::Decode(format!("{}: {}", type_name::<T>(), e)))
    }
}
