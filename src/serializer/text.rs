//! Text serializer
//!
//! Uses a type's canonical textual form (`Display` out, `FromStr` in), so
//! primitives, `String` and any user type implementing both traits need no
//! custom serializer.

use std::any::type_name;
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::str::FromStr;

use crate::buffer::Buffer;
use crate::error::{KvError, Result};
use super::Serializer;

/// UTF-8 text serializer for `T: Display + FromStr`
///
/// ## Lossy Values
/// - `f32`/`f64` `NaN` parses back as `NaN`, which never compares equal to
///   itself. Every other float, including infinities and `-0.0`, round-trips
///   exactly because `Display` prints the shortest representation that
///   parses to the same bits.
/// - Types whose `Display` and `FromStr` disagree (e.g. a `Display` that
///   pads or truncates) are only as faithful as that pair.
pub struct TextSerializer<T> {
    _marker: PhantomData<fn() -> T>,
}

/// The shared text serializer for `String` keys and values
pub type StringSerializer = TextSerializer<String>;

impl<T> TextSerializer<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TextSerializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TextSerializer<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TextSerializer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextSerializer<{}>", type_name::<T>())
    }
}

impl<T> Serializer<T> for TextSerializer<T>
where
    T: Display + FromStr,
    T::Err: Display,
{
    fn serialize(&self, value: &T) -> Result<Buffer> {
        Ok(Buffer::from(value.to_string()))
    }

    fn deserialize(&self, buffer: &Buffer) -> Result<T> {
        let text = std::str::from_utf8(buffer).map_err(|e| {
            KvError::Decode(format!(
                "{}: payload is not valid UTF-8: {}",
                type_name::<T>(),
                e
            ))
        })?;

        text.parse::<T>().map_err(|e| {
            KvError::Decode(format!(
                "{}: cannot parse {:?}: {}",
                type_name::<T>(),
                text,
                e
            ))
        })
    }
}
