//! Serializer Module
//!
//! Bidirectional mapping between a domain type and a [`Buffer`].
//!
//! ## Round-trip Law
//! For every representable `t`, `deserialize(serialize(t))` yields a value
//! equal to `t`. A serializer whose encoding is lossy for some values lists
//! those values in its own documentation.
//!
//! ## Provided Serializers
//! - [`TextSerializer`]: any `T: Display + FromStr` (the default choice)
//! - [`StringSerializer`]: `TextSerializer<String>`
//! - [`BytesSerializer`]: identity for raw payloads
//! - [`BincodeSerializer`]: compact binary for serde types
//! - [`JsonSerializer`]: JSON for serde types

mod text;
mod raw;
mod structured;

pub use text::{StringSerializer, TextSerializer};
pub use raw::BytesSerializer;
pub use structured::{BincodeSerializer, JsonSerializer};

use crate::buffer::Buffer;
use crate::error::Result;

/// Converts values of `T` to and from store payloads.
///
/// Implementations hold no per-call state, so one instance can be shared
/// (behind an `Arc`) by any number of templates and threads.
pub trait Serializer<T>: Send + Sync {
    /// Render `value` as a payload.
    ///
    /// Fails with [`KvError::Encode`](crate::KvError::Encode) only for values
    /// outside the encoding's range.
    fn serialize(&self, value: &T) -> Result<Buffer>;

    /// Parse a payload back into `T`.
    ///
    /// Fails with [`KvError::Decode`](crate::KvError::Decode) when the bytes
    /// are not a valid encoding of `T`.
    fn deserialize(&self, buffer: &Buffer) -> Result<T>;
}
