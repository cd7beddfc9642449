//! # typedkv
//!
//! A type-safe command facade over a Redis-compatible key-value store:
//! - Typed views for strings, hashes, lists, sets and sorted sets
//! - Pluggable serializers mapping domain types to store payloads
//! - Pluggable connections behind one capability trait
//! - A blocking RESP2 client and an in-process store
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 KvTemplate<K, V, HK, HV>                    │
//! │        (facade: one instance of every operation view)       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │       Key / Value / Hash / List / Set / ZSet operations     │
//! │            (typed args <-> Buffer via Serializer)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │   Arc<dyn Connection>   │
//!          └────────────┬────────────┘
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌──────────────┐         ┌──────────────────┐
//!   │RespConnection│         │ MemoryConnection │
//!   │ (RESP2/TCP)  │         │   (in-process)   │
//!   └──────────────┘         └──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use typedkv::{MemoryConnection, StringKvTemplate};
//!
//! let template = StringKvTemplate::with_connection(Arc::new(MemoryConnection::new()));
//! let values = template.ops_for_value();
//!
//! values.set(&"greeting".to_string(), &"hello".to_string())?;
//! assert_eq!(values.get(&"greeting".to_string())?, Some("hello".to_string()));
//! # Ok::<(), typedkv::KvError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod buffer;
pub mod serializer;
pub mod protocol;
pub mod connection;
pub mod ops;
pub mod template;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::ConnectionConfig;
pub use buffer::Buffer;
pub use serializer::{
    BincodeSerializer, BytesSerializer, JsonSerializer, Serializer, StringSerializer,
    TextSerializer,
};
pub use connection::{Connection, MemoryConnection, Order, RespConnection};
pub use ops::{
    HashOperations, KeyOperations, ListOperations, SetOperations, SharedConnection,
    SharedSerializer, Ttl, ValueOperations, ZSetOperations,
};
pub use template::{KvTemplate, KvTemplateBuilder, StringKvTemplate};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of typedkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
