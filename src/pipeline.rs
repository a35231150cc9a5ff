//! load -> collect -> build -> stats -> write, once per input.

use crate::Result;
use crate::collect::collect_records;
use crate::config::{InputDescriptor, RunConfig};
use crate::diagnostics;
use crate::output::{render_filter_spec, write_filter_spec};
use crate::schema::load_schema;
use crate::stats::FilterStats;
use crate::tree::{FilterSpec, build_filter_spec};

use anyhow::Context;
use std::io::Write;
use std::path::PathBuf;

/// Where rendered filter specs go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    /// Each input's descriptor output path.
    Files,
    /// Standard output; stats move to stderr so the document stays clean.
    Stdout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputReport {
    pub schema: PathBuf,
    /// None when the spec went to stdout.
    pub output: Option<PathBuf>,
    pub stats: FilterStats,
}

/// Load a schema and fold it into a filter spec, without writing anything.
pub fn build_for_input(input: &InputDescriptor) -> Result<FilterSpec> {
    let schema = load_schema(&input.schema)?;

    let records = collect_records(&schema).with_context(|| {
        diagnostics::error_message(format!("collect nodes from {}", input.schema.display()))
    })?;
    if records.is_empty() {
        diagnostics::warn(format!(
            "{} has no resources or functions; filter spec will be empty",
            input.schema.display()
        ));
    }

    let spec = build_filter_spec(&records).with_context(|| {
        diagnostics::error_message(format!("build filter spec for {}", input.schema.display()))
    })?;
    Ok(spec)
}

pub fn process_input(input: &InputDescriptor, sink: Sink) -> Result<InputReport> {
    tracing::info!("Building filter for: {}", input.schema.display());

    let spec = build_for_input(input)?;
    let stats = FilterStats::from_spec(&spec);

    let output = match sink {
        Sink::Files => {
            println!("Filter stats for: {}\n{}\n", input.schema.display(), stats);
            write_filter_spec(&spec, &input.output)?;
            tracing::info!("Writing filter spec output to: {}", input.output.display());
            Some(input.output.clone())
        }
        Sink::Stdout => {
            eprintln!("Filter stats for: {}\n{}\n", input.schema.display(), stats);
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&render_filter_spec(&spec)?)?;
            writeln!(stdout)?;
            None
        }
    };

    Ok(InputReport {
        schema: input.schema.clone(),
        output,
        stats,
    })
}

/// Process every input in order. The first failure aborts the run.
pub fn run(config: &RunConfig, sink: Sink) -> Result<Vec<InputReport>> {
    let mut reports = Vec::with_capacity(config.inputs.len());
    for input in &config.inputs {
        let report = process_input(input, sink).with_context(|| {
            diagnostics::error_message(format!("process {}", input.schema.display()))
        })?;
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::CollectError;
    use crate::tree::NodeKind;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;

    fn write_schema(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn run_writes_filter_spec_next_to_schema() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_schema(
            dir.path(),
            "kube.json",
            r#"{
                "name": "kubernetes",
                "resources": {
                    "kubernetes:kube:Pod": {},
                    "kubernetes:kube/apps:Deployment": {}
                },
                "functions": {
                    "kubernetes:kube/apps:listDeployments": {}
                }
            }"#,
        );

        let config = RunConfig::from_paths(&[schema.clone()], "-filter").unwrap();
        let reports = run(&config, Sink::Files).unwrap();

        let out = dir.path().join("kube-filter.json");
        assert_eq!(
            reports,
            vec![InputReport {
                schema,
                output: Some(out.clone()),
                stats: FilterStats {
                    modules: 1,
                    sub_modules: 2,
                    leaves: 3,
                },
            }]
        );

        let spec: FilterSpec = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        let kube = &spec.nodes[0];
        assert_eq!(kube.name, "kube");
        let apps = &kube.children[1];
        assert_eq!(apps.name, "apps");
        let kinds: Vec<_> = apps.children.iter().map(|n| (n.name.as_str(), n.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("Deployment", NodeKind::Resource),
                ("listDeployments", NodeKind::Function),
            ]
        );
    }

    #[test]
    fn bad_token_aborts_before_later_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_schema(
            dir.path(),
            "bad.json",
            r#"{ "resources": [ { "token": "pkg:a/b/c:Name" } ] }"#,
        );
        let good = write_schema(
            dir.path(),
            "good.json",
            r#"{ "resources": [ { "token": "pkg:a:Name" } ] }"#,
        );

        let config = RunConfig::from_paths(&[bad, good], "-filter").unwrap();
        let err = run(&config, Sink::Files).unwrap_err();

        let cause = err
            .chain()
            .find_map(|e| e.downcast_ref::<CollectError>())
            .cloned();
        assert_eq!(
            cause,
            Some(CollectError::UnsupportedNamespaceDepth {
                token: "pkg:a/b/c:Name".to_string(),
                depth: 2,
            })
        );
        assert!(!dir.path().join("bad-filter.json").exists());
        assert!(!dir.path().join("good-filter.json").exists());
    }

    #[test]
    fn unreadable_schema_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig::from_paths(&[dir.path().join("missing.json")], "-filter").unwrap();
        let err = run(&config, Sink::Files).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.json"));
    }

    #[test]
    fn empty_schema_builds_empty_spec() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write_schema(dir.path(), "empty.json", "{}");
        let input = InputDescriptor {
            schema,
            output: dir.path().join("empty-filter.json"),
        };

        assert_eq!(build_for_input(&input).unwrap(), FilterSpec::default());
    }
}
