#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::op_ref
)]

#[macro_use]
extern crate serde;

pub mod contraction;
pub mod distribution;
pub mod graph;
pub mod ids;
pub mod io;
pub mod numeric;
pub mod query;
pub mod spotar;
pub mod witness;

/// Slack factor applied to every node's edge range so that shortcut
/// insertion stays amortized O(1).
pub const GROWTH_FACTOR: f64 = 1.5;
