//! Flat-file surface of the engine.
//!
//! Every format is plain whitespace-delimited text. Malformed input is
//! fatal: readers return an error carrying a diagnostic and callers
//! abort, there is no retry semantics.

pub mod config;
pub mod demands;
pub mod edges;
pub mod graph_reader;
pub mod hierarchy;
pub mod specif;

use thiserror::Error;

/// Diagnostics for corrupted instance files.
#[derive(Error, Debug)]
pub enum InstanceError {
    #[error("{path}: empty file name or unreadable file")]
    Unreadable { path: String },
    #[error("{path}:{line}: {reason}")]
    Malformed {
        path: String,
        line: usize,
        reason: String,
    },
    #[error("{path}:{line}: probability {value} not in [0;1]")]
    ProbabilityOutOfRange {
        path: String,
        line: usize,
        value: f64,
    },
    #[error("{path}:{line}: probability mass sums to {total}, expected 1")]
    MassNotOne {
        path: String,
        line: usize,
        total: f64,
    },
    #[error("{path}: not a demands file (bad header {header:?})")]
    BadHeader { path: String, header: String },
}
