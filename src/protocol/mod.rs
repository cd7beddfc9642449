//! Protocol Module
//!
//! RESP2, the request/reply wire protocol spoken by `RespConnection`.
//!
//! ## Request Format
//! Every command is an array of bulk strings:
//! ```text
//! *<argc>\r\n
//! $<len>\r\n<arg bytes>\r\n     (repeated argc times)
//! ```
//!
//! ## Reply Frames
//! ```text
//! +<text>\r\n                   simple string
//! -<message>\r\n                error
//! :<i64>\r\n                    integer
//! $<len>\r\n<bytes>\r\n         bulk string ($-1\r\n is nil)
//! *<count>\r\n<frames...>       array       (*-1\r\n is nil array)
//! ```

mod command;
mod frame;
mod codec;
mod reply;

pub use command::Command;
pub use frame::Frame;
pub use codec::{
    encode_command, encode_frame, decode_frame, read_frame, write_command, write_frame,
    MAX_BULK_LEN, MAX_LINE_LEN,
};
pub use reply::{format_score, parse_score};
