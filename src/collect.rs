//! Token parsing and record collection.
//!
//! A token looks like `provider:module[/submodule]:Name`. Every resource and
//! function in a schema becomes one `Record`; the combined list is sorted by
//! (module, submodule, name) so the tree builder can fold it in one pass.

use crate::schema::PackageSchema;

use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Resource,
    Function,
}

/// One schema entry, split into its grouping keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub module: String,
    /// Empty for module-level entries.
    pub submodule: String,
    pub name: String,
    pub kind: EntryKind,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    #[error("couldn't parse package token {token:?}: expected provider:module:name")]
    MalformedToken { token: String },

    #[error("did not expect multiple sub modules in token {token:?} (namespace depth {depth})")]
    UnsupportedNamespaceDepth { token: String, depth: usize },
}

impl Record {
    /// Split a token into a record. Only one level of sub-module is supported.
    pub fn parse(token: &str, kind: EntryKind) -> Result<Record, CollectError> {
        let parts: Vec<&str> = token.split(':').collect();
        let &[_, namespace, name] = parts.as_slice() else {
            return Err(CollectError::MalformedToken {
                token: token.to_string(),
            });
        };

        let mod_parts: Vec<&str> = namespace.split('/').collect();
        let submodule = match mod_parts.len() - 1 {
            0 => "",
            1 => mod_parts[1],
            depth => {
                return Err(CollectError::UnsupportedNamespaceDepth {
                    token: token.to_string(),
                    depth,
                });
            }
        };

        Ok(Record {
            module: mod_parts[0].to_string(),
            submodule: submodule.to_string(),
            name: name.to_string(),
            kind,
            token: token.to_string(),
        })
    }

    /// The (module, submodule, name) triple the tree is grouped by.
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.module, &self.submodule, &self.name)
    }

    /// Grouping order. Kind and token only break ties between entries that
    /// share all three keys, which keeps the order total.
    pub fn sort_cmp(&self, other: &Record) -> Ordering {
        self.key()
            .cmp(&other.key())
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.token.cmp(&other.token))
    }
}

/// Collect resources then functions from a schema and sort them.
pub fn collect_records(schema: &PackageSchema) -> Result<Vec<Record>, CollectError> {
    let mut records = Vec::with_capacity(schema.resources.len() + schema.functions.len());

    for token in schema.resources.tokens() {
        records.push(Record::parse(token, EntryKind::Resource)?);
    }
    for token in schema.functions.tokens() {
        records.push(Record::parse(token, EntryKind::Function)?);
    }

    // Stable sort: identical entries keep their collection order.
    records.sort_by(Record::sort_cmp);
    Ok(records)
}
