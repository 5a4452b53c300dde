use std::io::BufRead;

use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::line::{LineReader, first_field, split_pair};
use crate::store::{Store, StoreKind};

/// Which operation a request body applies to each of its lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Add,
    Del,
}

/// A single parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert a key, with a value for map stores
    Add { key: String, value: String },
    /// Remove a key
    Del { key: String },
}

impl Command {
    /// Parse one raw body line for a store of the given kind.
    ///
    /// The line is trimmed first. Set stores use the whole line as the key.
    /// Map stores split on spaces: an add needs a key and a value, a delete
    /// uses only the first field.
    pub fn parse(line: &str, line_no: usize, kind: StoreKind, mutation: Mutation) -> Result<Self> {
        let line = line.trim();
        let cmd = match (kind, mutation) {
            (StoreKind::Set, Mutation::Add) => Command::Add {
                key: line.to_string(),
                value: String::new(),
            },
            (StoreKind::Set, Mutation::Del) => Command::Del {
                key: line.to_string(),
            },
            (StoreKind::Map, Mutation::Add) => {
                let (key, value) = split_pair(line).ok_or_else(|| Error::Parse {
                    line_no,
                    content: line.to_string(),
                })?;
                Command::Add {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            }
            (StoreKind::Map, Mutation::Del) => Command::Del {
                key: first_field(line).to_string(),
            },
        };
        Ok(cmd)
    }

    /// Apply the command to the store
    pub fn execute(self, store: &Store) {
        match self {
            Command::Add { key, value } => store.add(key, &value),
            Command::Del { key } => store.del(&key),
        }
    }
}

/// Apply every line of `body` to `store`, returning how many lines were applied.
///
/// Lines are applied as they are read. On a malformed line or a scan failure
/// the remaining lines are skipped and the error is returned; lines already
/// applied stay applied.
pub fn apply_body<R: BufRead>(body: R, mutation: Mutation, store: &Store) -> Result<usize> {
    let mut lines = LineReader::new(body);
    let mut applied = 0;
    while let Some(line) = lines.next_line()? {
        Command::parse(&line, lines.line_no(), store.kind(), mutation)?.execute(store);
        applied += 1;
    }
    debug!(?mutation, applied, path = %store.path().display(), "request body applied");
    Ok(applied)
}

/// Response body for a read: the store's content verbatim
pub fn render(store: &Store) -> String {
    store.content()
}
