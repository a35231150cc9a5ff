//! Filter spec serialization.

use crate::Result;
use crate::diagnostics;
use crate::tree::FilterSpec;

use anyhow::Context;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::Path;

/// Serialize with a 4-space indent.
pub fn render_filter_spec(spec: &FilterSpec) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    spec.serialize(&mut ser)?;
    Ok(buf)
}

/// Write the rendered spec, creating parent directories as needed.
pub fn write_filter_spec(spec: &FilterSpec, path: &Path) -> Result<()> {
    let bytes = render_filter_spec(spec)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            diagnostics::error_message(format!("create output directory {}", parent.display()))
        })?;
    }

    fs::write(path, bytes).with_context(|| {
        diagnostics::error_message(format!("write filter spec {}", path.display()))
    })?;
    Ok(())
}
