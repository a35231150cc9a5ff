//! Node counts for a built filter spec.

use crate::tree::FilterSpec;

use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub modules: usize,
    pub sub_modules: usize,
    pub leaves: usize,
}

impl FilterStats {
    /// Walk exactly two levels below the root: modules, then sub-modules.
    pub fn from_spec(spec: &FilterSpec) -> Self {
        let mut stats = FilterStats {
            modules: spec.nodes.len(),
            ..Default::default()
        };
        for module in &spec.nodes {
            stats.sub_modules += module.children.len();
            for sub in &module.children {
                stats.leaves += sub.children.len();
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.modules + self.sub_modules + self.leaves
    }
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Module Count:        {}", self.modules)?;
        writeln!(f, "Sub-module Count:     {}", self.sub_modules)?;
        writeln!(f, "Leaf-node Count:      {}", self.leaves)?;
        write!(f, "Total rendered nodes: {}", self.total())
    }
}
