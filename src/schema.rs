//! Package schema loading.
//!
//! JSON shape (only the fields we read):
//! {
//!   "name": "kube",
//!   "resources": {
//!     "kubernetes:core/v1:Pod": { ... },     // keyed by token
//!     ...
//!   },
//!   "functions": [
//!     { "token": "kubernetes:apps/v1:listDeployments", ... },   // or a list
//!     ...
//!   ]
//! }
//!
//! Both collections accept either shape, and a missing or `null` collection is
//! empty. Everything other than the token is ignored; the schema is not
//! validated beyond what deserialization requires.

use crate::Result;
use crate::diagnostics;

use anyhow::Context;
use serde::Deserialize;
use serde::de::{Deserializer, Error as _};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageSchema {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_entries")]
    pub resources: EntriesSpec,

    #[serde(default, deserialize_with = "deserialize_entries")]
    pub functions: EntriesSpec,
}

/// Raw entry collection as it appears in the schema document.
#[derive(Debug, Clone)]
pub enum EntriesSpec {
    // { "pkg:mod:Name": { ... } }
    Keyed(BTreeMap<String, Value>),
    // [ { "token": "pkg:mod:Name", ... } ]
    Listed(Vec<RawEntry>),
}

impl Default for EntriesSpec {
    fn default() -> Self {
        EntriesSpec::Listed(Vec::new())
    }
}

#[derive(Debug, Clone)]
pub struct RawEntry {
    pub token: String,
}

impl EntriesSpec {
    /// Tokens in document order (key order for the keyed shape).
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            EntriesSpec::Keyed(map) => map.keys().map(String::as_str).collect(),
            EntriesSpec::Listed(list) => list.iter().map(|e| e.token.as_str()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EntriesSpec::Keyed(map) => map.len(),
            EntriesSpec::Listed(list) => list.len(),
        }
    }
}

impl PackageSchema {
    pub fn from_json(text: &str) -> Result<Self> {
        let schema = serde_json::from_str(text)?;
        Ok(schema)
    }

    /// Display name for logs; falls back to "<unnamed>".
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

fn deserialize_entries<'de, D>(deserializer: D) -> std::result::Result<EntriesSpec, D::Error>
where
    D: Deserializer<'de>,
{
    // Dispatch on shape ourselves so a bad list entry names the missing token.
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(EntriesSpec::default()),
        Some(Value::Object(map)) => Ok(EntriesSpec::Keyed(map.into_iter().collect())),
        Some(Value::Array(items)) => {
            let mut entries = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                let token = item.get("token").and_then(Value::as_str).ok_or_else(|| {
                    D::Error::custom(diagnostics::error_message(format!(
                        "entry {} has no string `token` field",
                        idx
                    )))
                })?;
                entries.push(RawEntry {
                    token: token.to_string(),
                });
            }
            Ok(EntriesSpec::Listed(entries))
        }
        Some(other) => Err(D::Error::custom(diagnostics::error_message(format!(
            "expected an object keyed by token or a list of entries, found {}",
            other
        )))),
    }
}

/// Read and parse a schema file.
pub fn load_schema(path: &Path) -> Result<PackageSchema> {
    let text = fs::read_to_string(path).with_context(|| {
        diagnostics::error_message(format!("read schema file {}", path.display()))
    })?;

    let schema = PackageSchema::from_json(&text).with_context(|| {
        diagnostics::error_message(format!("parse schema file {}", path.display()))
    })?;

    tracing::debug!(
        package = schema.display_name(),
        resources = schema.resources.len(),
        functions = schema.functions.len(),
        "loaded schema {}",
        path.display()
    );

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn keyed_and_listed_collections_both_parse() {
        let schema = PackageSchema::from_json(
            r#"{
                "name": "kube",
                "resources": {
                    "kubernetes:core/v1:Pod": { "description": "a pod" },
                    "kubernetes:apps/v1:Deployment": {}
                },
                "functions": [
                    { "token": "kubernetes:apps/v1:listDeployments", "inputs": {} }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(schema.display_name(), "kube");
        assert_eq!(
            schema.resources.tokens(),
            vec!["kubernetes:apps/v1:Deployment", "kubernetes:core/v1:Pod"]
        );
        assert_eq!(
            schema.functions.tokens(),
            vec!["kubernetes:apps/v1:listDeployments"]
        );
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let schema = PackageSchema::from_json("{}").unwrap();
        assert_eq!(schema.display_name(), "<unnamed>");
        assert_eq!(schema.resources.len(), 0);
        assert_eq!(schema.functions.len(), 0);
    }

    #[test]
    fn listed_entry_without_token_names_the_field() {
        let err = PackageSchema::from_json(
            r#"{ "functions": [ { "token": "p:m:ok" }, { "name": "x" } ] }"#,
        )
        .unwrap_err();
        assert!(
            err.to_string().contains("entry 1 has no string `token` field"),
            "{}",
            err
        );
    }

    #[test]
    fn null_collections_are_empty() {
        let schema =
            PackageSchema::from_json(r#"{ "resources": null, "functions": null }"#).unwrap();
        assert_eq!(schema.resources.len(), 0);
        assert_eq!(schema.functions.len(), 0);
    }

    #[test]
    fn scalar_collection_is_rejected() {
        let err = PackageSchema::from_json(r#"{ "resources": 3 }"#).unwrap_err();
        assert!(err.to_string().contains("found 3"), "{}", err);
    }

    #[test]
    fn load_schema_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "resources": [ {{ "token": "p:m:R" }} ] }}"#).unwrap();

        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema.resources.tokens(), vec!["p:m:R"]);
    }

    #[test]
    fn load_schema_names_missing_file_in_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = load_schema(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("absent.json"));
    }
}
