//! RESP Connection
//!
//! Blocking RESP2 client over a single TCP session.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::time::Duration;

use parking_lot::Mutex;

use crate::buffer::Buffer;
use crate::config::ConnectionConfig;
use crate::error::{KvError, Result};
use crate::protocol::{format_score, read_frame, write_command, Command, Frame};
use super::{Connection, Order};

/// Buffered halves of one TCP stream
struct Session {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Set once a round trip fails part way; the stream may hold stale reply bytes
    broken: bool,
}

/// A connection to a RESP2 store
///
/// One request is in flight at a time: the session sits behind a mutex that
/// is held from writing a command until its reply has been read.
///
/// A failed write or read (timeout, dropped socket, bad framing) leaves the
/// stream out of step with the replies, so the session is retired and every
/// later call fails with `NotConnected`. Reconnect to continue.
pub struct RespConnection {
    session: Mutex<Session>,

    /// Peer address for logging
    peer_addr: String,
}

impl RespConnection {
    /// Connect and prepare the session described by `config`
    ///
    /// After the TCP connect this applies the configured timeouts and then
    /// sends `AUTH`, `SELECT` and `CLIENT SETNAME` as configured.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;

        let stream = TcpStream::connect(&config.addr)?;
        let connection = Self::from_stream(stream)?;
        connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;

        if let Some(password) = &config.password {
            connection
                .execute(Command::new("AUTH").arg(password.as_str()))?
                .into_ok("AUTH")?;
        }
        if let Some(database) = config.database {
            connection
                .execute(Command::new("SELECT").arg(database.to_string()))?
                .into_ok("SELECT")?;
        }
        if let Some(name) = &config.client_name {
            connection
                .execute(Command::new("CLIENT").arg("SETNAME").arg(name.as_str()))?
                .into_ok("CLIENT SETNAME")?;
        }

        tracing::debug!("Connected to {}", connection.peer_addr);
        Ok(connection)
    }

    /// Wrap an already-connected stream, without any session setup
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            session: Mutex::new(Session {
                reader: BufReader::new(read_stream),
                writer: BufWriter::new(write_stream),
                broken: false,
            }),
            peer_addr,
        })
    }

    /// Configure connection timeouts (milliseconds, 0 disables)
    pub fn set_timeouts(&self, read_ms: u64, write_ms: u64) -> Result<()> {
        let session = self.session.lock();
        let read_stream = session.reader.get_ref();
        let write_stream = session.writer.get_ref();

        read_stream.set_read_timeout((read_ms > 0).then(|| Duration::from_millis(read_ms)))?;
        write_stream.set_write_timeout((write_ms > 0).then(|| Duration::from_millis(write_ms)))?;

        Ok(())
    }

    /// Send any command and return its reply
    ///
    /// An error reply comes back as `KvError::Server`; every other frame is
    /// returned as-is for the caller to check.
    pub fn execute(&self, command: Command) -> Result<Frame> {
        let mut session = self.session.lock();
        if session.broken {
            return Err(KvError::Io(std::io::Error::new(
                ErrorKind::NotConnected,
                format!("session to {} was closed after a failed round trip", self.peer_addr),
            )));
        }

        tracing::trace!(
            "Sending {} ({} args) to {}",
            command.name(),
            command.arguments().len(),
            self.peer_addr
        );
        let reply = match Self::round_trip(&mut session, &command) {
            Ok(reply) => reply,
            Err(e) => {
                session.broken = true;
                tracing::warn!(
                    "{} to {} failed, closing session: {}",
                    command.name(),
                    self.peer_addr,
                    e
                );
                return Err(e);
            }
        };

        match reply {
            Frame::Error(message) => {
                tracing::debug!("{} rejected by {}: {}", command.name(), self.peer_addr, message);
                Err(KvError::Server(message))
            }
            frame => Ok(frame),
        }
    }

    /// Whether the session was retired by a failed round trip
    pub fn is_broken(&self) -> bool {
        self.session.lock().broken
    }

    /// `PING`, expecting `+PONG`
    pub fn ping(&self) -> Result<()> {
        match self.execute(Command::new("PING"))? {
            Frame::Simple(ref text) if text == "PONG" => Ok(()),
            other => Err(KvError::unexpected_reply("PING", "+PONG", other.kind())),
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    fn round_trip(session: &mut Session, command: &Command) -> Result<Frame> {
        write_command(&mut session.writer, command)?;
        read_frame(&mut session.reader)
    }

    fn zrange_command(key: &Buffer, start: i64, stop: i64, order: Order) -> Command {
        let name = match order {
            Order::Ascending => "ZRANGE",
            Order::Descending => "ZREVRANGE",
        };
        Command::new(name)
            .arg(key)
            .arg(start.to_string())
            .arg(stop.to_string())
    }

    fn zrange_by_score_command(key: &Buffer, min: f64, max: f64, order: Order) -> Command {
        // The reverse form takes its window as max, min
        let (name, first, second) = match order {
            Order::Ascending => ("ZRANGEBYSCORE", min, max),
            Order::Descending => ("ZREVRANGEBYSCORE", max, min),
        };
        Command::new(name)
            .arg(key)
            .arg(format_score(first))
            .arg(format_score(second))
    }
}

impl Connection for RespConnection {
    // -------------------------------------------------------------------------
    // Keys
    // -------------------------------------------------------------------------

    fn exists(&self, key: &Buffer) -> Result<bool> {
        let found = self
            .execute(Command::new("EXISTS").arg(key))?
            .into_count("EXISTS")?;
        Ok(found > 0)
    }

    fn del(&self, keys: &[Buffer]) -> Result<u64> {
        self.execute(Command::new("DEL").args(keys))?
            .into_count("DEL")
    }

    fn expire(&self, key: &Buffer, seconds: i64) -> Result<bool> {
        self.execute(Command::new("EXPIRE").arg(key).arg(seconds.to_string()))?
            .into_bool("EXPIRE")
    }

    fn pexpire(&self, key: &Buffer, millis: i64) -> Result<bool> {
        self.execute(Command::new("PEXPIRE").arg(key).arg(millis.to_string()))?
            .into_bool("PEXPIRE")
    }

    fn persist(&self, key: &Buffer) -> Result<bool> {
        self.execute(Command::new("PERSIST").arg(key))?
            .into_bool("PERSIST")
    }

    fn ttl(&self, key: &Buffer) -> Result<i64> {
        self.execute(Command::new("TTL").arg(key))?
            .into_integer("TTL")
    }

    fn pttl(&self, key: &Buffer) -> Result<i64> {
        self.execute(Command::new("PTTL").arg(key))?
            .into_integer("PTTL")
    }

    // -------------------------------------------------------------------------
    // Strings
    // -------------------------------------------------------------------------

    fn set(&self, key: &Buffer, value: &Buffer) -> Result<()> {
        self.execute(Command::new("SET").arg(key).arg(value))?
            .into_ok("SET")
    }

    fn set_nx(&self, key: &Buffer, value: &Buffer) -> Result<bool> {
        self.execute(Command::new("SET").arg(key).arg(value).arg("NX"))?
            .into_ok_or_nil("SET NX")
    }

    fn set_ex(&self, key: &Buffer, value: &Buffer, seconds: u64) -> Result<()> {
        self.execute(
            Command::new("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(seconds.to_string()),
        )?
        .into_ok("SET EX")
    }

    fn get(&self, key: &Buffer) -> Result<Option<Buffer>> {
        self.execute(Command::new("GET").arg(key))?
            .into_optional_bulk("GET")
    }

    fn getset(&self, key: &Buffer, value: &Buffer) -> Result<Option<Buffer>> {
        self.execute(Command::new("GETSET").arg(key).arg(value))?
            .into_optional_bulk("GETSET")
    }

    fn mget(&self, keys: &[Buffer]) -> Result<Vec<Option<Buffer>>> {
        let values = self
            .execute(Command::new("MGET").args(keys))?
            .into_optional_bulk_array("MGET")?;
        expect_len("MGET", keys.len(), values.len())?;
        Ok(values)
    }

    fn incr_by(&self, key: &Buffer, delta: i64) -> Result<i64> {
        self.execute(Command::new("INCRBY").arg(key).arg(delta.to_string()))?
            .into_integer("INCRBY")
    }

    fn decr_by(&self, key: &Buffer, delta: i64) -> Result<i64> {
        self.execute(Command::new("DECRBY").arg(key).arg(delta.to_string()))?
            .into_integer("DECRBY")
    }

    fn append(&self, key: &Buffer, value: &Buffer) -> Result<u64> {
        self.execute(Command::new("APPEND").arg(key).arg(value))?
            .into_count("APPEND")
    }

    fn strlen(&self, key: &Buffer) -> Result<u64> {
        self.execute(Command::new("STRLEN").arg(key))?
            .into_count("STRLEN")
    }

    // -------------------------------------------------------------------------
    // Hashes
    // -------------------------------------------------------------------------

    fn hget(&self, key: &Buffer, field: &Buffer) -> Result<Option<Buffer>> {
        self.execute(Command::new("HGET").arg(key).arg(field))?
            .into_optional_bulk("HGET")
    }

    fn hmget(&self, key: &Buffer, fields: &[Buffer]) -> Result<Vec<Option<Buffer>>> {
        let values = self
            .execute(Command::new("HMGET").arg(key).args(fields))?
            .into_optional_bulk_array("HMGET")?;
        expect_len("HMGET", fields.len(), values.len())?;
        Ok(values)
    }

    fn hset(&self, key: &Buffer, field: &Buffer, value: &Buffer) -> Result<bool> {
        self.execute(Command::new("HSET").arg(key).arg(field).arg(value))?
            .into_bool("HSET")
    }

    fn hset_multiple(&self, key: &Buffer, entries: &[(Buffer, Buffer)]) -> Result<u64> {
        let command = entries
            .iter()
            .fold(Command::new("HSET").arg(key), |command, (field, value)| {
                command.arg(field).arg(value)
            });
        self.execute(command)?.into_count("HSET")
    }

    fn hgetall(&self, key: &Buffer) -> Result<Vec<(Buffer, Buffer)>> {
        self.execute(Command::new("HGETALL").arg(key))?
            .into_bulk_pairs("HGETALL")
    }

    fn hkeys(&self, key: &Buffer) -> Result<Vec<Buffer>> {
        self.execute(Command::new("HKEYS").arg(key))?
            .into_bulk_array("HKEYS")
    }

    fn hvals(&self, key: &Buffer) -> Result<Vec<Buffer>> {
        self.execute(Command::new("HVALS").arg(key))?
            .into_bulk_array("HVALS")
    }

    fn hdel(&self, key: &Buffer, fields: &[Buffer]) -> Result<u64> {
        self.execute(Command::new("HDEL").arg(key).args(fields))?
            .into_count("HDEL")
    }

    fn hexists(&self, key: &Buffer, field: &Buffer) -> Result<bool> {
        self.execute(Command::new("HEXISTS").arg(key).arg(field))?
            .into_bool("HEXISTS")
    }

    fn hlen(&self, key: &Buffer) -> Result<u64> {
        self.execute(Command::new("HLEN").arg(key))?
            .into_count("HLEN")
    }

    // -------------------------------------------------------------------------
    // Lists
    // -------------------------------------------------------------------------

    fn lpush(&self, key: &Buffer, values: &[Buffer]) -> Result<u64> {
        self.execute(Command::new("LPUSH").arg(key).args(values))?
            .into_count("LPUSH")
    }

    fn rpush(&self, key: &Buffer, values: &[Buffer]) -> Result<u64> {
        self.execute(Command::new("RPUSH").arg(key).args(values))?
            .into_count("RPUSH")
    }

    fn lpop(&self, key: &Buffer) -> Result<Option<Buffer>> {
        self.execute(Command::new("LPOP").arg(key))?
            .into_optional_bulk("LPOP")
    }

    fn rpop(&self, key: &Buffer) -> Result<Option<Buffer>> {
        self.execute(Command::new("RPOP").arg(key))?
            .into_optional_bulk("RPOP")
    }

    fn lrange(&self, key: &Buffer, start: i64, stop: i64) -> Result<Vec<Buffer>> {
        self.execute(
            Command::new("LRANGE")
                .arg(key)
                .arg(start.to_string())
                .arg(stop.to_string()),
        )?
        .into_bulk_array("LRANGE")
    }

    fn llen(&self, key: &Buffer) -> Result<u64> {
        self.execute(Command::new("LLEN").arg(key))?
            .into_count("LLEN")
    }

    fn lindex(&self, key: &Buffer, index: i64) -> Result<Option<Buffer>> {
        self.execute(Command::new("LINDEX").arg(key).arg(index.to_string()))?
            .into_optional_bulk("LINDEX")
    }

    fn lrem(&self, key: &Buffer, count: i64, value: &Buffer) -> Result<u64> {
        self.execute(
            Command::new("LREM")
                .arg(key)
                .arg(count.to_string())
                .arg(value),
        )?
        .into_count("LREM")
    }

    // -------------------------------------------------------------------------
    // Sets
    // -------------------------------------------------------------------------

    fn sadd(&self, key: &Buffer, members: &[Buffer]) -> Result<u64> {
        self.execute(Command::new("SADD").arg(key).args(members))?
            .into_count("SADD")
    }

    fn srem(&self, key: &Buffer, members: &[Buffer]) -> Result<u64> {
        self.execute(Command::new("SREM").arg(key).args(members))?
            .into_count("SREM")
    }

    fn sismember(&self, key: &Buffer, member: &Buffer) -> Result<bool> {
        self.execute(Command::new("SISMEMBER").arg(key).arg(member))?
            .into_bool("SISMEMBER")
    }

    fn smembers(&self, key: &Buffer) -> Result<Vec<Buffer>> {
        self.execute(Command::new("SMEMBERS").arg(key))?
            .into_bulk_array("SMEMBERS")
    }

    fn scard(&self, key: &Buffer) -> Result<u64> {
        self.execute(Command::new("SCARD").arg(key))?
            .into_count("SCARD")
    }

    fn spop(&self, key: &Buffer) -> Result<Option<Buffer>> {
        self.execute(Command::new("SPOP").arg(key))?
            .into_optional_bulk("SPOP")
    }

    fn sinter(&self, keys: &[Buffer]) -> Result<Vec<Buffer>> {
        self.execute(Command::new("SINTER").args(keys))?
            .into_bulk_array("SINTER")
    }

    fn sunion(&self, keys: &[Buffer]) -> Result<Vec<Buffer>> {
        self.execute(Command::new("SUNION").args(keys))?
            .into_bulk_array("SUNION")
    }

    // -------------------------------------------------------------------------
    // Sorted Sets
    // -------------------------------------------------------------------------

    fn zadd(&self, key: &Buffer, members: &[(Buffer, f64)]) -> Result<u64> {
        let command = members
            .iter()
            .fold(Command::new("ZADD").arg(key), |command, (member, score)| {
                command.arg(format_score(*score)).arg(member)
            });
        self.execute(command)?.into_count("ZADD")
    }

    fn zrem(&self, key: &Buffer, members: &[Buffer]) -> Result<u64> {
        self.execute(Command::new("ZREM").arg(key).args(members))?
            .into_count("ZREM")
    }

    fn zincrby(&self, key: &Buffer, increment: f64, member: &Buffer) -> Result<f64> {
        self.execute(
            Command::new("ZINCRBY")
                .arg(key)
                .arg(format_score(increment))
                .arg(member),
        )?
        .into_score("ZINCRBY")
    }

    fn zscore(&self, key: &Buffer, member: &Buffer) -> Result<Option<f64>> {
        self.execute(Command::new("ZSCORE").arg(key).arg(member))?
            .into_optional_score("ZSCORE")
    }

    fn zrank(&self, key: &Buffer, member: &Buffer) -> Result<Option<u64>> {
        self.execute(Command::new("ZRANK").arg(key).arg(member))?
            .into_optional_count("ZRANK")
    }

    fn zrevrank(&self, key: &Buffer, member: &Buffer) -> Result<Option<u64>> {
        self.execute(Command::new("ZREVRANK").arg(key).arg(member))?
            .into_optional_count("ZREVRANK")
    }

    fn zcard(&self, key: &Buffer) -> Result<u64> {
        self.execute(Command::new("ZCARD").arg(key))?
            .into_count("ZCARD")
    }

    fn zrange(&self, key: &Buffer, start: i64, stop: i64, order: Order) -> Result<Vec<Buffer>> {
        let command = Self::zrange_command(key, start, stop, order);
        let name = command.name();
        self.execute(command)?.into_bulk_array(name)
    }

    fn zrange_with_scores(
        &self,
        key: &Buffer,
        start: i64,
        stop: i64,
        order: Order,
    ) -> Result<Vec<(Buffer, f64)>> {
        let command = Self::zrange_command(key, start, stop, order).arg("WITHSCORES");
        let name = command.name();
        self.execute(command)?.into_scored_members(name)
    }

    fn zrange_by_score(
        &self,
        key: &Buffer,
        min: f64,
        max: f64,
        order: Order,
    ) -> Result<Vec<Buffer>> {
        let command = Self::zrange_by_score_command(key, min, max, order);
        let name = command.name();
        self.execute(command)?.into_bulk_array(name)
    }

    fn zrange_by_score_with_scores(
        &self,
        key: &Buffer,
        min: f64,
        max: f64,
        order: Order,
    ) -> Result<Vec<(Buffer, f64)>> {
        let command = Self::zrange_by_score_command(key, min, max, order).arg("WITHSCORES");
        let name = command.name();
        self.execute(command)?.into_scored_members(name)
    }
}

/// Batch reads must answer every requested key or field
fn expect_len(command: &str, requested: usize, received: usize) -> Result<()> {
    if requested != received {
        return Err(KvError::Protocol(format!(
            "{}: requested {} entries, reply has {}",
            command, requested, received
        )));
    }
    Ok(())
}
