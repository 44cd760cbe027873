//! Per-tenant typed values

use std::collections::HashMap;
use std::sync::RwLock;

use super::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Counter(i64),
}

/// Tenant id → (key → typed value)
///
/// A tenant must be registered before it is written to.
#[derive(Default)]
pub struct TenantCounters {
    tenants: RwLock<HashMap<String, HashMap<String, Value>>>,
}

impl TenantCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the tenant was newly registered
    pub fn register(&self, tenant: &str) -> Result<bool, StoreError> {
        let mut tenants = self.tenants.write().map_err(|_| StoreError::Unavailable)?;
        if tenants.contains_key(tenant) {
            return Ok(false);
        }
        tenants.insert(tenant.to_string(), HashMap::new());
        Ok(true)
    }

    /// Drop a tenant and everything it holds; returns whether it existed
    pub fn remove(&self, tenant: &str) -> Result<bool, StoreError> {
        let mut tenants = self.tenants.write().map_err(|_| StoreError::Unavailable)?;
        Ok(tenants.remove(tenant).is_some())
    }

    pub fn tenants(&self) -> Result<usize, StoreError> {
        let tenants = self.tenants.read().map_err(|_| StoreError::Unavailable)?;
        Ok(tenants.len())
    }

    pub fn set_text(&self, tenant: &str, key: &str, value: String) -> Result<(), StoreError> {
        let mut tenants = self.tenants.write().map_err(|_| StoreError::Unavailable)?;
        let table = tenants
            .get_mut(tenant)
            .ok_or_else(|| StoreError::UnknownTenant(tenant.to_string()))?;
        table.insert(key.to_string(), Value::Text(value));
        Ok(())
    }

    /// Add `delta` to the counter at `key`, starting from zero
    ///
    /// Fails with [`StoreError::NotNumeric`] if `key` holds text.
    pub fn increment(&self, tenant: &str, key: &str, delta: i64) -> Result<i64, StoreError> {
        let mut tenants = self.tenants.write().map_err(|_| StoreError::Unavailable)?;
        let table = tenants
            .get_mut(tenant)
            .ok_or_else(|| StoreError::UnknownTenant(tenant.to_string()))?;

        match table
            .entry(key.to_string())
            .or_insert(Value::Counter(0))
        {
            Value::Counter(count) => {
                *count += delta;
                Ok(*count)
            }
            Value::Text(_) => Err(StoreError::NotNumeric(key.to_string())),
        }
    }
}
