use super::InstanceError;
use crate::ids::NodeId;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;

/// Persistence of the contraction hierarchy: one `(node, level)` pair
/// per line. `nodes[i]` is the node at level `i`, `levels[i]` the
/// level of node `i`; the two arrays are inverse permutations.
pub struct HierarchyIo {
    pub nodes: Vec<NodeId>,
    pub levels: Vec<u32>,
}

impl HierarchyIo {
    pub fn new(nodes: Vec<NodeId>, levels: Vec<u32>) -> HierarchyIo {
        HierarchyIo { nodes, levels }
    }

    pub fn read(path: &str) -> Result<HierarchyIo> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("opening hierarchy file {}", path))?;
        let mut nodes = Vec::new();
        let mut levels = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let mut next = |what: &str| -> Result<u32> {
                tokens
                    .next()
                    .ok_or_else(|| InstanceError::Malformed {
                        path: path.to_string(),
                        line: lineno + 1,
                        reason: format!("missing {}", what),
                    })?
                    .parse::<u32>()
                    .map_err(|_| {
                        InstanceError::Malformed {
                            path: path.to_string(),
                            line: lineno + 1,
                            reason: format!("bad {}", what),
                        }
                        .into()
                    })
            };
            nodes.push(NodeId(next("node id")?));
            levels.push(next("level")?);
        }
        Ok(HierarchyIo { nodes, levels })
    }

    pub fn write(&self, path: &str) -> Result<()> {
        let mut out = fs::File::create(path)
            .with_context(|| format!("creating hierarchy file {}", path))?;
        for (node, level) in self.nodes.iter().zip(self.levels.iter()) {
            writeln!(out, "{}\t{}", node, level)?;
        }
        Ok(())
    }

    /// Copy the loaded table into a graph's hierarchy arrays.
    pub fn recover_into(&self, sorted_nodes: &mut [NodeId], levels: &mut [u32]) {
        for i in 0..sorted_nodes.len().min(self.nodes.len()) {
            sorted_nodes[i] = self.nodes[i];
            levels[i] = self.levels[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_hierarchy_reloads_unchanged() {
        let table = HierarchyIo::new(
            vec![NodeId(2), NodeId(0), NodeId(3), NodeId(1)],
            vec![1, 3, 0, 2],
        );
        let path = std::env::temp_dir().join("larkspur_hierarchy_io_roundtrip.txt");
        let path = path.to_string_lossy().into_owned();
        table.write(&path).unwrap();
        let reloaded = HierarchyIo::read(&path).unwrap();

        assert_eq!(reloaded.nodes, table.nodes, "node column must survive");
        assert_eq!(reloaded.levels, table.levels, "level column must survive");
    }
}
