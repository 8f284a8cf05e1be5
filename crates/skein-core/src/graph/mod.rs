//! The passage link graph and the operations over it.
//!
//! Edge direction is `source → target`: the source passage's body
//! references the target by name. Insertion order is preserved
//! everywhere it is observable — graphs are [`indexmap`]-backed so that
//! identical inputs always produce identical output sequences.

pub mod build;
pub mod cycles;
pub mod order;
pub mod subgraph;

pub use build::{LinkGraph, build_link_graph};
pub use cycles::find_all_cycles;
pub use order::order;
pub use subgraph::subgraph;
