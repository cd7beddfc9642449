//! Protocol codec
//!
//! Encoding and decoding functions for RESP2.
//!
//! Commands are only ever encoded (client to store) and frames only ever
//! decoded (store to client), but both directions are provided for frames so
//! tests can play the store's side of a conversation.

use std::io::{BufRead, Cursor, ErrorKind, Read, Write};

use crate::buffer::Buffer;
use crate::error::{KvError, Result};
use super::{Command, Frame};

/// Maximum bulk string size accepted from the store (512 MB, the store's own limit)
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Maximum length of a frame header or status line, CRLF included
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Upper bound on pre-allocation for array replies
const MAX_PREALLOC: usize = 1024;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a command as an array of bulk strings
pub fn encode_command(command: &Command) -> Vec<u8> {
    let args = command.arguments();
    let payload_len: usize = args.iter().map(|a| a.len() + 16).sum();

    let mut message = Vec::with_capacity(command.name().len() + payload_len + 32);
    write_header(&mut message, b'*', args.len() as i64 + 1);
    write_bulk(&mut message, command.name().as_bytes());
    for arg in args {
        write_bulk(&mut message, arg);
    }

    message
}

/// Encode a single frame
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let mut message = Vec::new();
    encode_frame_into(&mut message, frame);
    message
}

fn encode_frame_into(out: &mut Vec<u8>, frame: &Frame) {
    match frame {
        Frame::Simple(text) => write_line(out, b'+', text.as_bytes()),
        Frame::Error(message) => write_line(out, b'-', message.as_bytes()),
        Frame::Integer(n) => write_header(out, b':', *n),
        Frame::Bulk(data) => write_bulk(out, data),
        Frame::Null => write_header(out, b'$', -1),
        Frame::Array(items) => {
            write_header(out, b'*', items.len() as i64);
            for item in items {
                encode_frame_into(out, item);
            }
        }
        Frame::NullArray => write_header(out, b'*', -1),
    }
}

fn write_line(out: &mut Vec<u8>, tag: u8, body: &[u8]) {
    out.push(tag);
    out.extend_from_slice(body);
    out.extend_from_slice(b"\r\n");
}

fn write_header(out: &mut Vec<u8>, tag: u8, n: i64) {
    write_line(out, tag, n.to_string().as_bytes());
}

fn write_bulk(out: &mut Vec<u8>, data: &[u8]) {
    write_header(out, b'$', data.len() as i64);
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode one frame from the front of `bytes`
///
/// Returns the frame and the number of bytes consumed. A truncated frame is
/// a protocol error.
pub fn decode_frame(bytes: &[u8]) -> Result<(Frame, usize)> {
    let mut cursor = Cursor::new(bytes);
    match read_frame(&mut cursor) {
        Ok(frame) => Ok((frame, cursor.position() as usize)),
        Err(KvError::Io(ref e)) if e.kind() == ErrorKind::UnexpectedEof => Err(KvError::Protocol(
            format!("Incomplete frame: input ended after {} bytes", bytes.len()),
        )),
        Err(e) => Err(e),
    }
}

/// Read one complete frame from a stream
///
/// Blocks until the frame is complete or the stream fails. A stream that
/// closes mid-frame surfaces as an `UnexpectedEof` I/O error.
pub fn read_frame<R: BufRead>(reader: &mut R) -> Result<Frame> {
    let line = read_line(reader)?;
    let (&tag, rest) = line
        .split_first()
        .ok_or_else(|| KvError::Protocol("Empty frame line".to_string()))?;

    match tag {
        b'+' => Ok(Frame::Simple(line_text(rest)?)),
        b'-' => Ok(Frame::Error(line_text(rest)?)),
        b':' => Ok(Frame::Integer(line_integer(rest)?)),
        b'$' => read_bulk(reader, line_integer(rest)?),
        b'*' => read_array(reader, line_integer(rest)?),
        _ => Err(KvError::Protocol(format!(
            "Unknown frame type byte: 0x{:02x}",
            tag
        ))),
    }
}

fn read_bulk<R: BufRead>(reader: &mut R, declared: i64) -> Result<Frame> {
    if declared == -1 {
        return Ok(Frame::Null);
    }
    let len = usize::try_from(declared)
        .map_err(|_| KvError::Protocol(format!("Invalid bulk length: {}", declared)))?;
    if len > MAX_BULK_LEN {
        return Err(KvError::Protocol(format!(
            "Bulk string too large: {} bytes (max {})",
            len, MAX_BULK_LEN
        )));
    }

    // Payload plus trailing CRLF
    let mut data = vec![0u8; len + 2];
    reader.read_exact(&mut data)?;
    if !data.ends_with(b"\r\n") {
        return Err(KvError::Protocol(format!(
            "Bulk string of {} bytes not terminated by CRLF",
            len
        )));
    }
    data.truncate(len);

    Ok(Frame::Bulk(Buffer::from(data)))
}

fn read_array<R: BufRead>(reader: &mut R, declared: i64) -> Result<Frame> {
    if declared == -1 {
        return Ok(Frame::NullArray);
    }
    let count = usize::try_from(declared)
        .map_err(|_| KvError::Protocol(format!("Invalid array length: {}", declared)))?;

    let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        items.push(read_frame(reader)?);
    }

    Ok(Frame::Array(items))
}

/// Read one CRLF-terminated line, without the terminator
fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    let read = reader
        .by_ref()
        .take(MAX_LINE_LEN as u64)
        .read_until(b'\n', &mut line)?;

    if read == 0 {
        return Err(KvError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            "connection closed before reply",
        )));
    }
    if !line.ends_with(b"\n") && line.len() >= MAX_LINE_LEN {
        return Err(KvError::Protocol(format!(
            "Line exceeds {} bytes without a terminator",
            MAX_LINE_LEN
        )));
    }
    if !line.ends_with(b"\r\n") {
        if line.ends_with(b"\n") {
            return Err(KvError::Protocol("Line not terminated by CRLF".to_string()));
        }
        return Err(KvError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            "connection closed mid-line",
        )));
    }

    line.truncate(line.len() - 2);
    Ok(line)
}

fn line_text(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| KvError::Protocol(format!("Status line is not UTF-8: {}", e)))
}

fn line_integer(bytes: &[u8]) -> Result<i64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(|| {
            KvError::Protocol(format!(
                "Invalid integer in frame header: {:?}",
                String::from_utf8_lossy(bytes)
            ))
        })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Write a frame to a stream
pub fn write_frame<W: Write>(writer: &mut W, frame: &Frame) -> Result<()> {
    let bytes = encode_frame(frame);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
