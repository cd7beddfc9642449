//! Frame definitions
//!
//! One decoded RESP2 value.

use crate::buffer::Buffer;

/// A RESP2 frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// `+OK`
    Simple(String),

    /// `-ERR ...`, the store rejected the command
    Error(String),

    /// `:42`
    Integer(i64),

    /// `$3\r\nfoo`
    Bulk(Buffer),

    /// `$-1`, the nil bulk string
    Null,

    /// `*2\r\n...`
    Array(Vec<Frame>),

    /// `*-1`, the nil array
    NullArray,
}

impl Frame {
    /// Human-readable name of this frame's type, used in protocol errors
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Simple(_) => "simple string",
            Frame::Error(_) => "error",
            Frame::Integer(_) => "integer",
            Frame::Bulk(_) => "bulk string",
            Frame::Null => "nil",
            Frame::Array(_) => "array",
            Frame::NullArray => "nil array",
        }
    }

    /// Build a bulk string frame
    pub fn bulk(data: impl Into<Buffer>) -> Self {
        Frame::Bulk(data.into())
    }

    /// Build a simple string frame
    pub fn simple(text: impl Into<String>) -> Self {
        Frame::Simple(text.into())
    }
}
