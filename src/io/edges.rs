use super::graph_reader::read_pdf;
use super::specif::Specif;
use crate::distribution::Distribution;
use crate::graph::edge::Edge;
use crate::ids::NodeId;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::io::Write;

/// Persistence of shortcut edges:
/// `origin destination middle_node pdf_0 .. pdf_N` per line.
pub struct EdgeIo;

impl EdgeIo {
    pub fn read(path: &str, specif: &Specif) -> Result<Vec<Edge>> {
        let content =
            fs::read_to_string(path).with_context(|| format!("opening shortcut file {}", path))?;
        let mut edges = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let mut next_id = |what: &str| -> Result<NodeId> {
                let token = tokens
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("{}:{}: missing {}", path, lineno + 1, what))?;
                Ok(NodeId(token.parse::<u32>().with_context(|| {
                    format!("{}:{}: bad {}", path, lineno + 1, what)
                })?))
            };
            let origin = next_id("origin")?;
            let destination = next_id("destination")?;
            let middle_node = next_id("middle node")?;
            let pdf = read_pdf(path, lineno + 1, tokens, specif)?;
            edges.push(Edge::new(
                true,
                origin,
                destination,
                Distribution::from_pdf(specif.delta(), pdf),
                middle_node,
            ));
        }
        info!("read {} shortcut edges from {}", edges.len(), path);
        Ok(edges)
    }

    pub fn write(path: &str, edges: &[Edge]) -> Result<()> {
        let mut out =
            fs::File::create(path).with_context(|| format!("creating shortcut file {}", path))?;
        for edge in edges {
            write!(out, "{} {} {} ", edge.origin, edge.destination, edge.middle_node.0)?;
            for i in 0..edge.weight.size() {
                write!(out, "{:.9} ", edge.weight.pdf_at(i))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
