use anyhow::{Context, Result};
use std::fs;

/// Instance specification: graph size and the shape of every
/// distribution grid (`nb_pts + 1` support points spaced by `delta`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Specif {
    nb_nodes: u32,
    nb_edges: u32,
    nb_pts: u32,
    delta: u32,
}

impl Specif {
    pub fn new(nb_nodes: u32, nb_edges: u32, nb_pts: u32, delta: u32) -> Specif {
        Specif {
            nb_nodes,
            nb_edges,
            nb_pts,
            delta,
        }
    }

    /// Read a specification file: four lines, one integer each
    /// (nodes, edges, support points, delta).
    pub fn read(path: &str) -> Result<Specif> {
        let content =
            fs::read_to_string(path).with_context(|| format!("opening specif file {}", path))?;
        let mut values = content.lines().map(|l| {
            l.trim()
                .parse::<u32>()
                .with_context(|| format!("{}: bad integer {:?}", path, l))
        });
        let mut next = |what: &str| {
            values
                .next()
                .unwrap_or_else(|| Err(anyhow::anyhow!("{}: missing {} line", path, what)))
        };
        Ok(Specif {
            nb_nodes: next("node count")?,
            nb_edges: next("edge count")?,
            nb_pts: next("support point count")?,
            delta: next("delta")?,
        })
    }

    pub fn nb_nodes(&self) -> u32 {
        self.nb_nodes
    }

    pub fn nb_edges(&self) -> u32 {
        self.nb_edges
    }

    pub fn nb_pts(&self) -> u32 {
        self.nb_pts
    }

    pub fn delta(&self) -> u32 {
        self.delta
    }

    /// Number of grid points of every distribution of this instance.
    pub fn grid_size(&self) -> usize {
        self.nb_pts as usize + 1
    }

    pub fn set_nb_nodes(&mut self, n: u32) {
        self.nb_nodes = n;
    }

    pub fn set_nb_edges(&mut self, n: u32) {
        self.nb_edges = n;
    }

    pub fn increment_edge(&mut self) {
        self.nb_edges += 1;
    }
}
