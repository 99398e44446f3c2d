use super::InstanceError;
use crate::ids::NodeId;
use anyhow::{Context, Result};
use rand::Rng;
use std::fs;
use std::io::Write;

/// One origin/destination query with its reliability target.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Demand {
    pub src: u32,
    pub dest: u32,
    pub alpha: f64,
    pub budget: u32,
}

impl Demand {
    pub fn od(&self) -> (NodeId, NodeId) {
        (NodeId(self.src), NodeId(self.dest))
    }
}

/// Demand list: `demands` header line, a count line, then one
/// space-delimited record per query.
pub struct Demands {
    demands: Vec<Demand>,
    nb_nodes: u32,
    tmax: u32,
}

impl Demands {
    pub fn new(nb_nodes: u32, tmax: u32) -> Demands {
        Demands {
            demands: Vec::new(),
            nb_nodes,
            tmax,
        }
    }

    pub fn read(path: &str, nb_nodes: u32) -> Result<Demands> {
        let content =
            fs::read_to_string(path).with_context(|| format!("opening demand file {}", path))?;
        let mut lines = content.lines();
        let header = lines.next().unwrap_or("").trim().to_string();
        if header != "demands" {
            return Err(InstanceError::BadHeader {
                path: path.to_string(),
                header,
            }
            .into());
        }
        let declared: usize = lines
            .next()
            .unwrap_or("")
            .trim()
            .parse()
            .with_context(|| format!("{}: bad demand count line", path))?;
        let body = lines.collect::<Vec<_>>().join("\n");
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_reader(body.as_bytes());
        let mut demands = Vec::with_capacity(declared);
        for record in reader.deserialize() {
            let demand: Demand = record.with_context(|| format!("{}: bad demand record", path))?;
            demands.push(demand);
        }
        anyhow::ensure!(
            demands.len() == declared,
            "{}: header declares {} demands, file holds {}",
            path,
            declared,
            demands.len()
        );
        Ok(Demands {
            demands,
            nb_nodes,
            tmax: 0,
        })
    }

    /// Generate `nb_queries` random OD pairs, or all ordered pairs
    /// when `nb_queries` is negative.
    pub fn generate(nb_queries: i64, nb_nodes: u32, tmax: u32) -> Demands {
        let mut rng = rand::rng();
        let mut demands = Vec::new();
        if nb_queries < 0 {
            for src in 0..nb_nodes {
                for dest in 0..nb_nodes {
                    if src == dest {
                        continue;
                    }
                    demands.push(Demand {
                        src,
                        dest,
                        alpha: rng.random_range(0..=100) as f64 / 100.0,
                        budget: rng.random_range(0..tmax.max(1)),
                    });
                }
            }
        } else {
            for _ in 0..nb_queries {
                let src = rng.random_range(0..nb_nodes);
                let mut dest = rng.random_range(0..nb_nodes);
                while dest == src {
                    dest = rng.random_range(0..nb_nodes);
                }
                demands.push(Demand {
                    src,
                    dest,
                    alpha: rng.random_range(0..=100) as f64 / 100.0,
                    budget: rng.random_range(0..tmax.max(1)),
                });
            }
        }
        Demands {
            demands,
            nb_nodes,
            tmax,
        }
    }

    pub fn serialize(&self, path: &str) -> Result<()> {
        let mut out =
            fs::File::create(path).with_context(|| format!("creating demand file {}", path))?;
        writeln!(out, "demands")?;
        writeln!(out, "{}", self.demands.len())?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_writer(out);
        for demand in &self.demands {
            writer.serialize(demand)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn demands(&self) -> &[Demand] {
        &self.demands
    }

    pub fn nb_nodes(&self) -> u32 {
        self.nb_nodes
    }

    pub fn tmax(&self) -> u32 {
        self.tmax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_demands_avoid_self_queries() {
        let demands = Demands::generate(50, 6, 30);
        assert_eq!(demands.demands().len(), 50);
        for d in demands.demands() {
            assert_ne!(d.src, d.dest, "self queries must not be generated");
            assert!(d.budget < 30);
            assert!(d.alpha >= 0.0 && d.alpha <= 1.0);
        }
    }

    #[test]
    fn all_pairs_mode_covers_every_ordered_pair() {
        let demands = Demands::generate(-1, 4, 10);
        assert_eq!(demands.demands().len(), 4 * 3);
    }
}
