//! Heuristics module for the planar TSP.
//!
//! This module exports the hull builder, the construction heuristic and the
//! local search used by the CH-NN + 2-opt pipeline.

pub mod hull;
pub mod construction;
pub mod local_search;

pub use hull::*;
pub use construction::*;
pub use local_search::*;
