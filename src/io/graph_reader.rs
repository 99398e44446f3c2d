use super::InstanceError;
use super::specif::Specif;
use crate::distribution::Distribution;
use crate::graph::edge::Edge;
use crate::ids::{INVALID_NODE_ID, NodeId};
use crate::numeric::{eq, gt, lt};
use anyhow::{Context, Result};
use log::info;
use std::fs;

/// Reader for flat edge lists.
///
/// One edge per line: `origin destination [middle_node] pdf_0 .. pdf_N`
/// with `N = nb_pts`. The middle-node column is only present in
/// hierarchized (contracted) graph files.
pub struct GraphReader;

impl GraphReader {
    pub fn read(path: &str, specif: &Specif, hierarchized: bool) -> Result<Vec<Edge>> {
        let content =
            fs::read_to_string(path).with_context(|| format!("opening edge file {}", path))?;
        let mut edges = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let mut next_u32 = |what: &str| -> Result<u32> {
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
            let origin = NodeId(next_u32("origin")?);
            let destination = NodeId(next_u32("destination")?);
            let middle_node = if hierarchized {
                NodeId(next_u32("middle node")?)
            } else {
                INVALID_NODE_ID
            };
            let pdf = read_pdf(path, lineno + 1, tokens, specif)?;
            edges.push(Edge::new(
                true,
                origin,
                destination,
                Distribution::from_pdf(specif.delta(), pdf),
                middle_node,
            ));
        }
        info!("read {} edges from {}", edges.len(), path);
        Ok(edges)
    }
}

/// Parse and validate `nb_pts + 1` probability values.
pub(super) fn read_pdf<'a>(
    path: &str,
    lineno: usize,
    mut tokens: impl Iterator<Item = &'a str>,
    specif: &Specif,
) -> Result<Vec<f64>> {
    let mut pdf = Vec::with_capacity(specif.grid_size());
    let mut total = 0.0;
    for i in 0..specif.grid_size() {
        let proba: f64 = tokens
            .next()
            .ok_or_else(|| InstanceError::Malformed {
                path: path.to_string(),
                line: lineno,
                reason: format!("expected {} probability values", specif.grid_size()),
            })?
            .parse()
            .map_err(|_| InstanceError::Malformed {
                path: path.to_string(),
                line: lineno,
                reason: format!("bad probability at support index {}", i),
            })?;
        if lt(proba, 0.0) || gt(proba, 1.0) {
            return Err(InstanceError::ProbabilityOutOfRange {
                path: path.to_string(),
                line: lineno,
                value: proba,
            }
            .into());
        }
        total += proba;
        pdf.push(proba);
    }
    if !eq(total, 1.0) {
        return Err(InstanceError::MassNotOne {
            path: path.to_string(),
            line: lineno,
            total,
        }
        .into());
    }
    Ok(pdf)
}
