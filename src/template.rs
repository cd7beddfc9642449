//! Template (facade)
//!
//! The composition root for typed access. A template takes one connection
//! and the serializers for its bound types, builds one instance of every
//! operation view at construction and hands out shared references to them.
//!
//! ```text
//!                         KvTemplate<K, V, HK, HV>
//!   ┌───────────────────────────────────────────────────────────────┐
//!   │ ops_for_key   ops_for_value   ops_for_hash   ops_for_list ... │
//!   └──────┬──────────────┬───────────────┬──────────────┬──────────┘
//!          │              │               │              │
//!          ▼              ▼               ▼              ▼
//!     Arc<dyn Connection>  +  Arc<dyn Serializer<K | V | HK | HV>>
//! ```
//!
//! Several templates with different type bindings may share one connection.
//! A template is either fully wired or never created: [`KvTemplate::new`]
//! takes every handle by type, and [`KvTemplateBuilder::build`] reports every
//! missing dependency at once.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{KvError, Result};
use crate::ops::{
    HashOperations, KeyOperations, ListOperations, SetOperations, SharedConnection,
    SharedSerializer, Ttl, ValueOperations, ZSetOperations,
};
use crate::serializer::StringSerializer;

/// Template with `String` keys, values, hash fields and hash values
pub type StringKvTemplate = KvTemplate<String, String>;

/// Typed facade over one connection
///
/// `HK` and `HV` are the hash field and hash value types; they default to
/// the key and value types.
pub struct KvTemplate<K, V, HK = K, HV = V> {
    connection: SharedConnection,
    key_ops: KeyOperations<K>,
    value_ops: ValueOperations<K, V>,
    hash_ops: HashOperations<K, HK, HV>,
    list_ops: ListOperations<K, V>,
    set_ops: SetOperations<K, V>,
    zset_ops: ZSetOperations<K, V>,
}

impl<K, V, HK, HV> KvTemplate<K, V, HK, HV> {
    /// Wire a template from a connection and one serializer per role
    pub fn new(
        connection: SharedConnection,
        key_serializer: SharedSerializer<K>,
        value_serializer: SharedSerializer<V>,
        hash_key_serializer: SharedSerializer<HK>,
        hash_value_serializer: SharedSerializer<HV>,
    ) -> Self {
        tracing::debug!(
            "Creating KvTemplate<{}, {}, {}, {}>",
            type_name::<K>(),
            type_name::<V>(),
            type_name::<HK>(),
            type_name::<HV>()
        );

        Self {
            key_ops: KeyOperations::new(Arc::clone(&connection), Arc::clone(&key_serializer)),
            value_ops: ValueOperations::new(
                Arc::clone(&connection),
                Arc::clone(&key_serializer),
                Arc::clone(&value_serializer),
            ),
            hash_ops: HashOperations::new(
                Arc::clone(&connection),
                Arc::clone(&key_serializer),
                hash_key_serializer,
                hash_value_serializer,
            ),
            list_ops: ListOperations::new(
                Arc::clone(&connection),
                Arc::clone(&key_serializer),
                Arc::clone(&value_serializer),
            ),
            set_ops: SetOperations::new(
                Arc::clone(&connection),
                Arc::clone(&key_serializer),
                Arc::clone(&value_serializer),
            ),
            zset_ops: ZSetOperations::new(
                Arc::clone(&connection),
                key_serializer,
                value_serializer,
            ),
            connection,
        }
    }

    /// Start a builder; `build` fails if any dependency is missing
    pub fn builder() -> KvTemplateBuilder<K, V, HK, HV> {
        KvTemplateBuilder::default()
    }

    // =========================================================================
    // Operation Views
    // =========================================================================

    pub fn ops_for_key(&self) -> &KeyOperations<K> {
        &self.key_ops
    }

    pub fn ops_for_value(&self) -> &ValueOperations<K, V> {
        &self.value_ops
    }

    pub fn ops_for_hash(&self) -> &HashOperations<K, HK, HV> {
        &self.hash_ops
    }

    pub fn ops_for_list(&self) -> &ListOperations<K, V> {
        &self.list_ops
    }

    pub fn ops_for_set(&self) -> &SetOperations<K, V> {
        &self.set_ops
    }

    pub fn ops_for_zset(&self) -> &ZSetOperations<K, V> {
        &self.zset_ops
    }

    // =========================================================================
    // Whole-key Commands
    // =========================================================================

    pub fn exists(&self, key: &K) -> Result<bool> {
        self.key_ops.exists(key)
    }

    /// Delete `keys` in one command; returns how many existed
    pub fn delete(&self, keys: &[K]) -> Result<u64> {
        self.key_ops.delete(keys)
    }

    pub fn expire(&self, key: &K, timeout: Duration) -> Result<bool> {
        self.key_ops.expire(key, timeout)
    }

    pub fn ttl(&self, key: &K) -> Result<Ttl> {
        self.key_ops.ttl(key)
    }

    /// The shared connection, e.g. to bind another template to it
    pub fn connection(&self) -> &SharedConnection {
        &self.connection
    }
}

impl<K, V> KvTemplate<K, V> {
    /// Wire a template whose hashes reuse the key and value serializers
    pub fn from_primary(
        connection: SharedConnection,
        key_serializer: SharedSerializer<K>,
        value_serializer: SharedSerializer<V>,
    ) -> Self {
        Self::new(
            connection,
            Arc::clone(&key_serializer),
            Arc::clone(&value_serializer),
            key_serializer,
            value_serializer,
        )
    }
}

impl StringKvTemplate {
    /// One shared [`StringSerializer`] serves every role
    pub fn with_connection(connection: SharedConnection) -> Self {
        let strings: SharedSerializer<String> = Arc::new(StringSerializer::new());
        Self::from_primary(connection, Arc::clone(&strings), strings)
    }
}

impl<K, V, HK, HV> fmt::Debug for KvTemplate<K, V, HK, HV> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KvTemplate<{}, {}, {}, {}>",
            type_name::<K>(),
            type_name::<V>(),
            type_name::<HK>(),
            type_name::<HV>()
        )
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`KvTemplate`]
pub struct KvTemplateBuilder<K, V, HK = K, HV = V> {
    connection: Option<SharedConnection>,
    key_serializer: Option<SharedSerializer<K>>,
    value_serializer: Option<SharedSerializer<V>>,
    hash_key_serializer: Option<SharedSerializer<HK>>,
    hash_value_serializer: Option<SharedSerializer<HV>>,
}

impl<K, V, HK, HV> Default for KvTemplateBuilder<K, V, HK, HV> {
    fn default() -> Self {
        Self {
            connection: None,
            key_serializer: None,
            value_serializer: None,
            hash_key_serializer: None,
            hash_value_serializer: None,
        }
    }
}

impl<K, V, HK, HV> KvTemplateBuilder<K, V, HK, HV> {
    pub fn connection(mut self, connection: SharedConnection) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn key_serializer(mut self, serializer: SharedSerializer<K>) -> Self {
        self.key_serializer = Some(serializer);
        self
    }

    pub fn value_serializer(mut self, serializer: SharedSerializer<V>) -> Self {
        self.value_serializer = Some(serializer);
        self
    }

    pub fn hash_key_serializer(mut self, serializer: SharedSerializer<HK>) -> Self {
        self.hash_key_serializer = Some(serializer);
        self
    }

    pub fn hash_value_serializer(mut self, serializer: SharedSerializer<HV>) -> Self {
        self.hash_value_serializer = Some(serializer);
        self
    }

    /// Build the template, or name every dependency that was not supplied
    pub fn build(self) -> Result<KvTemplate<K, V, HK, HV>> {
        match (
            self.connection,
            self.key_serializer,
            self.value_serializer,
            self.hash_key_serializer,
            self.hash_value_serializer,
        ) {
            (Some(connection), Some(keys), Some(values), Some(hash_keys), Some(hash_values)) => {
                Ok(KvTemplate::new(connection, keys, values, hash_keys, hash_values))
            }
            (connection, keys, values, hash_keys, hash_values) => {
                let missing: Vec<&str> = [
                    ("connection", connection.is_none()),
                    ("key serializer", keys.is_none()),
                    ("value serializer", values.is_none()),
                    ("hash key serializer", hash_keys.is_none()),
                    ("hash value serializer", hash_values.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();

                Err(KvError::Configuration(format!(
                    "KvTemplate is missing: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}
