//! Run configuration: which schemas to process and where their filter specs go.
//!
//! Config file shape:
//! {
//!   "inputs": [
//!     { "schema": "kube.json" },                              // -> kube-filter.json
//!     { "schema": "azure-native.json", "output": "out/az.json" }
//!   ],
//!   "suffix": "-filter"                                       // optional
//! }
//!
//! Relative paths in a config file are resolved against the file's directory.

use crate::Result;
use crate::diagnostics;

use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SUFFIX: &str = "-filter";

/// Schemas processed when neither paths nor a config file are given.
pub const DEFAULT_SCHEMAS: [&str; 2] = ["./kube.json", "./azure-native.json"];

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSpec {
    #[serde(default)]
    pub inputs: Vec<RawInput>,

    #[serde(default)]
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInput {
    pub schema: PathBuf,

    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// One schema to process, with its resolved output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescriptor {
    pub schema: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub inputs: Vec<InputDescriptor>,
}

impl ConfigSpec {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| {
            diagnostics::error_message(format!("read config file {}", path.display()))
        })?;
        let spec: ConfigSpec = serde_json::from_str(&text).with_context(|| {
            diagnostics::error_message(format!("parse config file {}", path.display()))
        })?;
        Ok(spec.relative_to(path.parent().unwrap_or(Path::new(""))))
    }

    fn relative_to(mut self, base: &Path) -> Self {
        for input in &mut self.inputs {
            input.schema = base.join(&input.schema);
            if let Some(out) = &input.output {
                input.output = Some(base.join(out));
            }
        }
        self
    }

    /// Resolve output paths and check that no two inputs write the same file.
    ///
    /// The config's own `suffix` wins; `default_suffix` applies when it has none.
    pub fn validate_and_build(&self, default_suffix: &str) -> Result<RunConfig> {
        if self.inputs.is_empty() {
            bail!(
                "{}",
                diagnostics::error_message("config contained no inputs")
            );
        }

        let suffix = self.suffix.as_deref().unwrap_or(default_suffix);

        let mut inputs = Vec::with_capacity(self.inputs.len());
        let mut seen: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
        for raw in &self.inputs {
            let output = match &raw.output {
                Some(out) => out.clone(),
                None => derive_output_path(&raw.schema, suffix)?,
            };

            if let Some(prev) = seen.insert(output.clone(), raw.schema.clone()) {
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "output {} is written by both {} and {}",
                        output.display(),
                        prev.display(),
                        raw.schema.display()
                    ))
                );
            }

            inputs.push(InputDescriptor {
                schema: raw.schema.clone(),
                output,
            });
        }

        Ok(RunConfig { inputs })
    }
}

impl RunConfig {
    /// Build a config from bare schema paths (CLI positional arguments).
    pub fn from_paths(paths: &[PathBuf], suffix: &str) -> Result<Self> {
        ConfigSpec {
            inputs: paths
                .iter()
                .map(|p| RawInput {
                    schema: p.clone(),
                    output: None,
                })
                .collect(),
            suffix: None,
        }
        .validate_and_build(suffix)
    }
}

/// `dir/kube.json` -> `dir/kube<suffix>.json`. A name without `.json` keeps its
/// full name before the suffix.
pub fn derive_output_path(schema: &Path, suffix: &str) -> Result<PathBuf> {
    let Some(file_name) = schema.file_name().and_then(|n| n.to_str()) else {
        bail!(
            "{}",
            diagnostics::error_message(format!(
                "cannot derive output path from {}",
                schema.display()
            ))
        );
    };
    let stem = file_name.strip_suffix(".json").unwrap_or(file_name);
    Ok(schema.with_file_name(format!("{}{}.json", stem, suffix)))
}
