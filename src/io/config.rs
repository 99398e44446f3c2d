use anyhow::{Context, Result};
use std::fs;

/// One tuple of ordering-cost coefficients
/// (edge quotient, depth, original-edge quotient, complexity quotient).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    pub param_eq: f64,
    pub param_ssd: f64,
    pub param_oeq: f64,
    pub param_cq: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            param_eq: 0.0,
            param_ssd: 0.0,
            param_oeq: 0.0,
            param_cq: 0.0,
        }
    }
}

/// Coefficient sets read from a config file, one 4-tuple per line.
pub struct Configs {
    configs: Vec<Config>,
}

impl Configs {
    pub fn read(path: &str) -> Result<Configs> {
        let content =
            fs::read_to_string(path).with_context(|| format!("opening config file {}", path))?;
        let mut configs = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let coefs: Vec<f64> = line
                .split_whitespace()
                .map(|t| {
                    t.parse::<f64>()
                        .with_context(|| format!("{}:{}: bad coefficient {:?}", path, lineno + 1, t))
                })
                .collect::<Result<_>>()?;
            anyhow::ensure!(
                coefs.len() == 4,
                "{}:{}: expected 4 coefficients, got {}",
                path,
                lineno + 1,
                coefs.len()
            );
            configs.push(Config {
                param_eq: coefs[0],
                param_ssd: coefs[1],
                param_oeq: coefs[2],
                param_cq: coefs[3],
            });
        }
        anyhow::ensure!(!configs.is_empty(), "{}: empty config file", path);
        Ok(Configs { configs })
    }

    pub fn first(&self) -> Config {
        self.configs[0]
    }

    pub fn all(&self) -> &[Config] {
        &self.configs
    }
}
