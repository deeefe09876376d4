//! Column type registry
//!
//! Maps declared database types to coercers. Resolution is a pure function of
//! the declared type and the registry's configuration, so the same column
//! always gets the same coercer. Resolved coercers are cached per table and
//! column; the cache is only dropped on explicit invalidation, typically
//! after a schema change.
//!
//! # Example
//!
//! ```rust
//! use oracle_coerce::column::ColumnDescriptor;
//! use oracle_coerce::config::CoercionConfig;
//! use oracle_coerce::registry::ColumnTypeRegistry;
//! use oracle_coerce::value::HostType;
//!
//! let mut registry = ColumnTypeRegistry::new(CoercionConfig::default());
//! let price = ColumnDescriptor::from_declared("price", "NUMBER(10,2)", false);
//!
//! let coercer = registry.coercer_for("orders", &price).unwrap();
//! assert_eq!(coercer.host_type(&price, None).unwrap(), HostType::Decimal);
//! ```

use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::coerce::{Coercer, LobCoercer, NumericCoercer, TemporalCoercer, TextCoercer};
use crate::column::{ColumnDescriptor, DatabaseType};
use crate::config::{CoercionConfig, FormatPolicy};
use crate::error::{Error, Result};

/// Resolves and caches coercers per table column
#[derive(Debug, Default)]
pub struct ColumnTypeRegistry {
    config: CoercionConfig,
    policy: Option<Arc<FormatPolicy>>,
    /// table -> column -> coercer, keys lowercased
    cache: IndexMap<String, IndexMap<String, Coercer>>,
}

impl ColumnTypeRegistry {
    /// Create a registry using the process-wide format policy
    pub fn new(config: CoercionConfig) -> Self {
        Self {
            config,
            policy: None,
            cache: IndexMap::new(),
        }
    }

    /// Use an explicit format policy for temporal columns
    ///
    /// Clears the cache, since cached coercers carry the previous policy.
    pub fn with_policy(mut self, policy: FormatPolicy) -> Self {
        self.policy = Some(Arc::new(policy));
        self.cache.clear();
        self
    }

    /// Resolve the coercer for a column without touching the cache
    pub fn resolve(&self, column: &ColumnDescriptor) -> Result<Coercer> {
        build(&self.config, self.policy.as_ref(), column)
    }

    /// Cached coercer for a table column, resolving it on first use
    pub fn coercer_for(&mut self, table: &str, column: &ColumnDescriptor) -> Result<&Coercer> {
        let Self {
            config,
            policy,
            cache,
        } = self;

        let columns = cache.entry(table.to_ascii_lowercase()).or_default();
        match columns.entry(column.name.to_ascii_lowercase()) {
            Entry::Occupied(entry) => {
                tracing::trace!(table = table, column = %column.name, "Coercer cache hit");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let coercer = build(config, policy.as_ref(), column)?;
                tracing::trace!(
                    table = table,
                    column = %column.name,
                    data_type = %column.data_type,
                    "Coercer cache miss, resolved"
                );
                Ok(entry.insert(coercer))
            }
        }
    }

    /// Drop all cached coercers of a table
    pub fn invalidate_table(&mut self, table: &str) {
        if let Some(columns) = self.cache.swap_remove(&table.to_ascii_lowercase()) {
            tracing::debug!(table = table, columns = columns.len(), "Invalidated table coercers");
        }
    }

    /// Drop every cached coercer
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
        tracing::debug!("Coercer cache cleared");
    }

    /// Number of cached column coercers
    pub fn len(&self) -> usize {
        self.cache.values().map(IndexMap::len).sum()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn build(
    config: &CoercionConfig,
    policy: Option<&Arc<FormatPolicy>>,
    column: &ColumnDescriptor,
) -> Result<Coercer> {
    match &column.data_type {
        DatabaseType::Date | DatabaseType::Timestamp | DatabaseType::TimestampTz => {
            let coercer = TemporalCoercer::new(config);
            Ok(Coercer::Temporal(match policy {
                Some(policy) => coercer.with_policy(Arc::clone(policy)),
                None => coercer,
            }))
        }
        DatabaseType::Number { .. } | DatabaseType::BinaryFloat | DatabaseType::BinaryDouble => {
            Ok(Coercer::Numeric(NumericCoercer::new()))
        }
        DatabaseType::Blob | DatabaseType::Clob => Ok(Coercer::Lob(LobCoercer::new())),
        DatabaseType::Varchar => Ok(Coercer::Text(TextCoercer::new())),
        DatabaseType::Unsupported(type_name) => Err(Error::SchemaMismatch {
            column: column.name.clone(),
            type_name: type_name.clone(),
        }),
    }
}
