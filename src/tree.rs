//! Filter tree: module -> sub-module -> leaf.
//!
//! JSON shape:
//! {
//!   "nodes": [
//!     {
//!       "name": "kube",
//!       "type": "module",
//!       "parentName": "",
//!       "token": "",
//!       "children": [
//!         {
//!           "name": "apps", "type": "module", "parentName": "kube", "token": "",
//!           "children": [
//!             { "name": "Deployment", "type": "resource", "parentName": "apps",
//!               "token": "kubernetes:kube/apps:Deployment" }
//!           ]
//!         }
//!       ]
//!     }
//!   ]
//! }
//!
//! Sub-modules are module-kind nodes. Leaves never carry `children`.

use crate::collect::{EntryKind, Record};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Module,
    Resource,
    Function,
}

impl From<EntryKind> for NodeKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Resource => NodeKind::Resource,
            EntryKind::Function => NodeKind::Function,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterNode {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    pub parent_name: String,

    /// Empty for module and sub-module nodes.
    #[serde(default)]
    pub token: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FilterNode>,
}

impl FilterNode {
    fn module(name: &str, parent_name: &str) -> Self {
        FilterNode {
            name: name.to_string(),
            kind: NodeKind::Module,
            parent_name: parent_name.to_string(),
            token: String::new(),
            children: Vec::new(),
        }
    }

    fn leaf(record: &Record, parent_name: &str) -> Self {
        FilterNode {
            name: record.name.clone(),
            kind: record.kind.into(),
            parent_name: parent_name.to_string(),
            token: record.token.clone(),
            children: Vec::new(),
        }
    }
}

/// Top-level module list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub nodes: Vec<FilterNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("records out of order: {current:?} follows {previous:?}")]
    UnsortedInput { previous: String, current: String },
}

/// Open accumulators while folding.
enum State {
    Empty,
    /// Module being filled, and the sub-module currently open inside it.
    SubmoduleOpen {
        module: FilterNode,
        submodule: FilterNode,
    },
}

/// Single-pass builder over records sorted by `Record::sort_cmp`.
///
/// Module and sub-module changes must arrive as contiguous runs; a record whose
/// (module, submodule, name) key sorts before the previous one is rejected
/// instead of producing duplicate groups.
pub struct FilterTreeBuilder {
    nodes: Vec<FilterNode>,
    state: State,
    /// Sort key and token of the previous record.
    last: Option<((String, String, String), String)>,
}

impl FilterTreeBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            state: State::Empty,
            last: None,
        }
    }

    pub fn push(&mut self, record: &Record) -> Result<(), BuildError> {
        self.check_order(record)?;

        let state = std::mem::replace(&mut self.state, State::Empty);
        let (module, mut submodule) = match state {
            State::Empty => open_pair(record),
            State::SubmoduleOpen {
                mut module,
                submodule,
            } => {
                if module.name != record.module {
                    // Module finished: close both accumulators.
                    module.children.push(submodule);
                    self.nodes.push(module);
                    open_pair(record)
                } else if submodule.name != record.submodule {
                    module.children.push(submodule);
                    let next = FilterNode::module(&record.submodule, &module.name);
                    (module, next)
                } else {
                    (module, submodule)
                }
            }
        };

        submodule
            .children
            .push(FilterNode::leaf(record, &submodule.name));

        self.state = State::SubmoduleOpen { module, submodule };
        Ok(())
    }

    pub fn finish(self) -> FilterSpec {
        let mut nodes = self.nodes;
        if let State::SubmoduleOpen {
            mut module,
            submodule,
        } = self.state
        {
            module.children.push(submodule);
            nodes.push(module);
        }
        FilterSpec { nodes }
    }

    fn check_order(&mut self, record: &Record) -> Result<(), BuildError> {
        let key = (
            record.module.clone(),
            record.submodule.clone(),
            record.name.clone(),
        );
        if let Some((prev_key, prev_token)) = &self.last {
            if *prev_key > key {
                return Err(BuildError::UnsortedInput {
                    previous: prev_token.clone(),
                    current: record.token.clone(),
                });
            }
        }
        self.last = Some((key, record.token.clone()));
        Ok(())
    }
}

impl Default for FilterTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn open_pair(record: &Record) -> (FilterNode, FilterNode) {
    let module = FilterNode::module(&record.module, "");
    let submodule = FilterNode::module(&record.submodule, &record.module);
    (module, submodule)
}

/// Fold sorted records into a filter spec. Empty input yields an empty spec.
pub fn build_filter_spec(records: &[Record]) -> Result<FilterSpec, BuildError> {
    let mut builder = FilterTreeBuilder::new();
    for record in records {
        builder.push(record)?;
    }
    Ok(builder.finish())
}
