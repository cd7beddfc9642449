//! Identity serializer for values that already are bytes.

use crate::buffer::Buffer;
use crate::error::Result;
use super::Serializer;

/// Passes payloads through unchanged. Never fails, never lossy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesSerializer;

impl Serializer<Buffer> for BytesSerializer {
    fn serialize(&self, value: &Buffer) -> Result<Buffer> {
        Ok(value.clone())
    }

    fn deserialize(&self, buffer: &Buffer) -> Result<Buffer> {
        Ok(buffer.clone())
    }
}

impl Serializer<Vec<u8>> for BytesSerializer {
    fn serialize(&self, value: &Vec<u8>) -> Result<Buffer> {
        Ok(Buffer::copy_from_slice(value))
    }

    fn deserialize(&self, buffer: &Buffer) -> Result<Vec<u8>> {
        Ok(buffer.to_vec())
    }
}
