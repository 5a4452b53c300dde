use std::sync::Arc;

use tracing::{error, info};

use crate::config::{TableConfig, is_valid_table_name};
use crate::error::{Error, Result};
use crate::store::Store;

/// The set of named tables served by one process
#[derive(Debug, Default, Clone)]
pub struct Registry {
    tables: Vec<(String, Arc<Store>)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an empty store for every configured table
    pub fn from_config(tables: &[TableConfig]) -> Result<Self> {
        let mut registry = Self::new();
        for table in tables {
            let store = Store::with_kind_name(&table.kind, &table.path)?;
            registry.insert(table.name.clone(), store)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, name: impl Into<String>, store: Store) -> Result<Arc<Store>> {
        let name = name.into();
        if !is_valid_table_name(&name) {
            return Err(Error::InvalidConfig(format!("invalid table name '{}'", name)));
        }
        if self.get(&name).is_some() {
            return Err(Error::InvalidConfig(format!("duplicate table name '{}'", name)));
        }
        let store = Arc::new(store);
        self.tables.push((name, Arc::clone(&store)));
        Ok(store)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Store>> {
        self.tables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, store)| store)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Store>)> {
        self.tables.iter().map(|(name, store)| (name.as_str(), store))
    }

    /// Load every table from its backing file, stopping at the first failure
    pub fn load_all(&self) -> Result<()> {
        for (name, store) in &self.tables {
            store
                .load()
                .inspect_err(|e| error!(table = %name, kind = ?e.kind(), "load failed: {}", e))?;
        }
        info!(tables = self.tables.len(), "all tables loaded");
        Ok(())
    }

    /// Save every table. Each save is attempted; the failures are returned by table name.
    pub fn save_all(&self) -> Vec<(String, Error)> {
        let mut failures = Vec::new();
        for (name, store) in &self.tables {
            match store.save() {
                Ok(()) => info!(table = %name, "table saved"),
                Err(e) => {
                    error!(table = %name, "save failed: {}", e);
                    failures.push((name.clone(), e));
                }
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::store::StoreKind;
    use tempfile::TempDir;

    #[test]
    fn test_from_config_builds_stores() {
        let tables = vec![
            TableConfig::new("acl", "set", "acl.txt"),
            TableConfig::new("routes", "map", "routes.txt"),
        ];
        let registry = Registry::from_config(&tables).unwrap();
        assert_eq!(registry.iter().count(), 2);
        assert_eq!(registry.get("acl").unwrap().kind(), StoreKind::Set);
        assert_eq!(registry.get("routes").unwrap().kind(), StoreKind::Map);
        assert!(registry.get("other").is_none());
    }

    #[test]
    fn test_from_config_unknown_kind() {
        let tables = vec![TableConfig::new("acl", "queue", "acl.txt")];
        let err = Registry::from_config(&tables).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let mut registry = Registry::new();
        registry.insert("t", Store::new(StoreKind::Set, "a")).unwrap();
        assert!(registry.insert("t", Store::new(StoreKind::Map, "b")).is_err());
    }

    #[test]
    fn test_insert_rejects_route_syntax() {
        let mut registry = Registry::new();
        for name in ["*x", ":id", "{t}", "a/b"] {
            let err = registry.insert(name, Store::new(StoreKind::Set, "a")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn test_load_all_fails_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present");
        std::fs::write(&present, "a\n").unwrap();
        let tables = vec![
            TableConfig::new("present", "set", &present),
            TableConfig::new("missing", "set", dir.path().join("missing")),
        ];
        let registry = Registry::from_config(&tables).unwrap();
        assert_eq!(registry.load_all().unwrap_err().kind(), ErrorKind::Io);
    }

    #[test]
    fn test_save_all_reports_each_failure() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present");
        std::fs::write(&present, "").unwrap();
        let tables = vec![
            TableConfig::new("present", "map", &present),
            TableConfig::new("missing", "set", dir.path().join("missing")),
        ];
        let registry = Registry::from_config(&tables).unwrap();
        registry.get("present").unwrap().add("k", "v");

        let failures = registry.save_all();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "missing");
        assert_eq!(std::fs::read_to_string(&present).unwrap(), "k v\n");
    }
}
