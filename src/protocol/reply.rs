//! Reply shape checks
//!
//! Every command expects one reply shape. These conversions turn a frame
//! into the shape the issuing command expects and fail with a protocol error
//! otherwise; nothing is coerced to a default. Error frames never get here:
//! `RespConnection::execute` turns them into `KvError::Server` first.

use crate::buffer::Buffer;
use crate::error::{KvError, Result};
use super::Frame;

impl Frame {
    /// `+OK`
    pub fn into_ok(self, command: &str) -> Result<()> {
        match self {
            Frame::Simple(ref text) if text == "OK" => Ok(()),
            other => Err(mismatch(command, "+OK", &other)),
        }
    }

    /// `+OK` or nil, as a flag (conditional writes such as `SET NX`)
    pub fn into_ok_or_nil(self, command: &str) -> Result<bool> {
        match self {
            Frame::Simple(ref text) if text == "OK" => Ok(true),
            Frame::Null => Ok(false),
            other => Err(mismatch(command, "+OK or nil", &other)),
        }
    }

    pub fn into_integer(self, command: &str) -> Result<i64> {
        match self {
            Frame::Integer(n) => Ok(n),
            other => Err(mismatch(command, "integer", &other)),
        }
    }

    /// Non-negative integer (counts and lengths)
    pub fn into_count(self, command: &str) -> Result<u64> {
        let n = self.into_integer(command)?;
        u64::try_from(n).map_err(|_| {
            KvError::Protocol(format!("{}: expected non-negative count, got {}", command, n))
        })
    }

    /// Integer `0` or `1`
    pub fn into_bool(self, command: &str) -> Result<bool> {
        match self.into_integer(command)? {
            0 => Ok(false),
            1 => Ok(true),
            n => Err(KvError::Protocol(format!(
                "{}: expected 0 or 1, got {}",
                command, n
            ))),
        }
    }

    /// Integer or nil (ranks)
    pub fn into_optional_count(self, command: &str) -> Result<Option<u64>> {
        match self {
            Frame::Null => Ok(None),
            Frame::Integer(n) => u64::try_from(n).map(Some).map_err(|_| {
                KvError::Protocol(format!("{}: expected non-negative integer, got {}", command, n))
            }),
            other => Err(mismatch(command, "integer or nil", &other)),
        }
    }

    pub fn into_bulk(self, command: &str) -> Result<Buffer> {
        match self {
            Frame::Bulk(data) => Ok(data),
            other => Err(mismatch(command, "bulk string", &other)),
        }
    }

    /// Bulk string or nil
    pub fn into_optional_bulk(self, command: &str) -> Result<Option<Buffer>> {
        match self {
            Frame::Bulk(data) => Ok(Some(data)),
            Frame::Null => Ok(None),
            other => Err(mismatch(command, "bulk string or nil", &other)),
        }
    }

    /// Array of bulk strings; a nil array reads as empty
    pub fn into_bulk_array(self, command: &str) -> Result<Vec<Buffer>> {
        self.into_array(command)?
            .into_iter()
            .map(|item| match item {
                Frame::Bulk(data) => Ok(data),
                other => Err(mismatch(command, "array of bulk strings", &other)),
            })
            .collect()
    }

    /// Array whose elements are bulk strings or nil (`MGET`, `HMGET`)
    pub fn into_optional_bulk_array(self, command: &str) -> Result<Vec<Option<Buffer>>> {
        self.into_array(command)?
            .into_iter()
            .map(|item| match item {
                Frame::Bulk(data) => Ok(Some(data)),
                Frame::Null => Ok(None),
                other => Err(mismatch(command, "array of bulk strings or nils", &other)),
            })
            .collect()
    }

    /// Flat array of alternating bulk strings, read as pairs (`HGETALL`)
    pub fn into_bulk_pairs(self, command: &str) -> Result<Vec<(Buffer, Buffer)>> {
        let items = self.into_bulk_array(command)?;
        if items.len() % 2 != 0 {
            return Err(KvError::Protocol(format!(
                "{}: expected an even number of elements, got {}",
                command,
                items.len()
            )));
        }

        let mut pairs = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(first), Some(second)) = (iter.next(), iter.next()) {
            pairs.push((first, second));
        }
        Ok(pairs)
    }

    /// Bulk string holding a score
    pub fn into_score(self, command: &str) -> Result<f64> {
        let data = self.into_bulk(command)?;
        parse_score(command, &data)
    }

    /// Bulk string holding a score, or nil
    pub fn into_optional_score(self, command: &str) -> Result<Option<f64>> {
        match self.into_optional_bulk(command)? {
            Some(data) => parse_score(command, &data).map(Some),
            None => Ok(None),
        }
    }

    /// Flat array of member, score, member, score, ... (`WITHSCORES`)
    pub fn into_scored_members(self, command: &str) -> Result<Vec<(Buffer, f64)>> {
        self.into_bulk_pairs(command)?
            .into_iter()
            .map(|(member, score)| Ok((member, parse_score(command, &score)?)))
            .collect()
    }

    fn into_array(self, command: &str) -> Result<Vec<Frame>> {
        match self {
            Frame::Array(items) => Ok(items),
            Frame::NullArray => Ok(Vec::new()),
            other => Err(mismatch(command, "array", &other)),
        }
    }
}

fn mismatch(command: &str, expected: &str, got: &Frame) -> KvError {
    tracing::warn!(command, expected, got = got.kind(), "Unexpected reply shape");
    KvError::unexpected_reply(command, expected, got.kind())
}

/// Parse a score as the store prints it (`3`, `2.5`, `inf`, `-inf`)
pub fn parse_score(command: &str, data: &[u8]) -> Result<f64> {
    std::str::from_utf8(data)
        .ok()
        .and_then(|text| text.parse::<f64>().ok())
        .filter(|score| !score.is_nan())
        .ok_or_else(|| {
            KvError::Protocol(format!(
                "{}: invalid score {:?}",
                command,
                String::from_utf8_lossy(data)
            ))
        })
}

/// Render a score the way the store parses it
pub fn format_score(score: f64) -> String {
    if score == f64::INFINITY {
        "+inf".to_string()
    } else if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        score.to_string()
    }
}
