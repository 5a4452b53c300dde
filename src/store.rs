use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::protocol::line::{LineReader, first_field, split_pair};

/// Shape of a store's table, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// A set of unique strings
    Set,
    /// Unique string keys mapped to string values
    Map,
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "set" => Ok(StoreKind::Set),
            "map" => Ok(StoreKind::Map),
            _ => Err(Error::UnknownStoreKind(s.to_string())),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Set => write!(f, "set"),
            StoreKind::Map => write!(f, "map"),
        }
    }
}

#[derive(Debug)]
enum Table {
    Set(HashSet<String>),
    Map(HashMap<String, String>),
}

impl Table {
    fn empty(kind: StoreKind) -> Self {
        match kind {
            StoreKind::Set => Table::Set(HashSet::new()),
            StoreKind::Map => Table::Map(HashMap::new()),
        }
    }

    fn len(&self) -> usize {
        match self {
            Table::Set(set) => set.len(),
            Table::Map(map) => map.len(),
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        match self {
            Table::Set(set) => {
                for key in set {
                    out.push_str(key);
                    out.push('\n');
                }
            }
            Table::Map(map) => {
                for (key, value) in map {
                    out.push_str(key);
                    out.push(' ');
                    out.push_str(value);
                    out.push('\n');
                }
            }
        }
        out
    }
}

/// In-memory table persisted to a flat text file.
///
/// Reads take the lock shared, mutations take it exclusively. `save` captures
/// the content under the shared lock and writes the file after releasing it,
/// so mutations committed in between are not part of that save.
#[derive(Debug)]
pub struct Store {
    kind: StoreKind,
    path: PathBuf,
    table: RwLock<Table>,
}

impl Store {
    /// Create an empty store. Nothing is read from `path` until [`Store::load`].
    pub fn new(kind: StoreKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            table: RwLock::new(Table::empty(kind)),
        }
    }

    /// Create an empty store from a textual kind (`"set"` or `"map"`)
    pub fn with_kind_name(kind: &str, path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(kind.parse()?, path))
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Add/Del/GetContent never fail, so a poisoned lock is taken over as is.
    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert `key`; in map mode also set its value (last write wins).
    ///
    /// The value is ignored by set stores. Map stores keep only the first
    /// space-separated field of both `key` and `value`, as that is all the
    /// file format holds; a map entry whose key or value field is empty is
    /// skipped, since it could not be loaded back.
    pub fn add(&self, key: impl Into<String>, value: &str) {
        let key = key.into();
        match &mut *self.write() {
            Table::Set(set) => {
                set.insert(key);
            }
            Table::Map(map) => {
                let (key, value) = (first_field(&key), first_field(value));
                if key.is_empty() || value.is_empty() {
                    warn!(path = %self.path.display(), key, value, "skipping map entry with an empty field");
                    return;
                }
                map.insert(key.to_string(), value.to_string());
            }
        }
    }

    /// Remove `key` if present
    pub fn del(&self, key: &str) {
        match &mut *self.write() {
            Table::Set(set) => {
                set.remove(key);
            }
            Table::Map(map) => {
                map.remove(key);
            }
        }
    }

    /// Newline-delimited snapshot of the table, in no particular order.
    ///
    /// Set stores render `"<key>\n"` per entry, map stores `"<key> <value>\n"`.
    pub fn content(&self) -> String {
        self.read().render()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Replace the table with the contents of the backing file.
    ///
    /// The table is cleared before the first line is parsed. A failure on a
    /// later line leaves whatever was parsed up to that point; the previous
    /// contents are not restored.
    pub fn load(&self) -> Result<usize> {
        let file = File::open(&self.path)?;
        let mut lines = LineReader::new(BufReader::new(file));

        let mut table = self.write();
        *table = Table::empty(self.kind);
        match &mut *table {
            Table::Set(set) => {
                while let Some(line) = lines.next_line()? {
                    set.insert(line.trim().to_string());
                }
            }
            Table::Map(map) => {
                while let Some(line) = lines.next_line()? {
                    let line = line.trim();
                    let (key, value) = split_pair(line).ok_or_else(|| Error::Parse {
                        line_no: lines.line_no(),
                        content: line.to_string(),
                    })?;
                    map.insert(key.to_string(), value.to_string());
                }
            }
        }

        let count = table.len();
        info!(path = %self.path.display(), kind = %self.kind, entries = count, "store loaded");
        Ok(count)
    }

    /// Overwrite the backing file with the current content.
    ///
    /// The file must already exist. Data is synced to disk before returning.
    pub fn save(&self) -> Result<()> {
        let content = self.content();

        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;

        debug!(path = %self.path.display(), bytes = content.len(), "store saved");
        Ok(())
    }
}
