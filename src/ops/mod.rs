//! Operation Views
//!
//! Typed command sets, one per data-structure family. Each view binds the
//! shared connection to the serializers its family needs and translates
//! every call in one direction per step:
//!
//! ```text
//!   typed args ──serialize──► Buffer args ──► Connection primitive
//!                                                   │
//!   typed result ◄──deserialize── Buffer reply ◄────┘
//! ```
//!
//! ## Rules Shared by Every View
//! - Absence is `None`, an empty collection or a zero count; never an error
//!   and never a default-constructed value.
//! - An empty input slice returns the empty result without a round trip.
//! - A batch is one call to the batch primitive, never one call per item.
//! - Errors come only from the connection or a serializer and are returned
//!   unchanged.

mod key;
mod value;
mod hash;
mod list;
mod set;
mod zset;

pub use key::{KeyOperations, Ttl};
pub use value::ValueOperations;
pub use hash::HashOperations;
pub use list::ListOperations;
pub use set::SetOperations;
pub use zset::ZSetOperations;

use std::sync::Arc;

use crate::buffer::Buffer;
use crate::connection::Connection;
use crate::error::Result;
use crate::serializer::Serializer;

/// Connection handle shared by a template and its views
pub type SharedConnection = Arc<dyn Connection>;

/// Serializer handle shared by a template and its views
pub type SharedSerializer<T> = Arc<dyn Serializer<T>>;

// =============================================================================
// Conversion helpers
// =============================================================================

pub(crate) fn encode_each<T>(serializer: &dyn Serializer<T>, items: &[T]) -> Result<Vec<Buffer>> {
    items.iter().map(|item| serializer.serialize(item)).collect()
}

pub(crate) fn decode_each<T>(
    serializer: &dyn Serializer<T>,
    buffers: Vec<Buffer>,
) -> Result<Vec<T>> {
    buffers
        .iter()
        .map(|buffer| serializer.deserialize(buffer))
        .collect()
}

pub(crate) fn decode_optional<T>(
    serializer: &dyn Serializer<T>,
    buffer: Option<Buffer>,
) -> Result<Option<T>> {
    buffer
        .map(|buffer| serializer.deserialize(&buffer))
        .transpose()
}

/// Element-wise decode keeping explicit absences in place
pub(crate) fn decode_aligned<T>(
    serializer: &dyn Serializer<T>,
    buffers: Vec<Option<Buffer>>,
) -> Result<Vec<Option<T>>> {
    buffers
        .into_iter()
        .map(|buffer| decode_optional(serializer, buffer))
        .collect()
}

pub(crate) fn decode_scored<T>(
    serializer: &dyn Serializer<T>,
    members: Vec<(Buffer, f64)>,
) -> Result<Vec<(T, f64)>> {
    members
        .iter()
        .map(|(member, score)| Ok((serializer.deserialize(member)?, *score)))
        .collect()
}

/// Log a call answered locally because its input was empty
pub(crate) fn skip_empty(operation: &str) {
    tracing::trace!("{}: empty input, no command sent", operation);
}
