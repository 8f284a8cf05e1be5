//! Command handlers for the `skein` binary.

pub mod completions;
pub mod graph;
pub mod split;
