//! CH-NN TSP Solver Library
//!
//! Approximate solutions to the planar Euclidean Traveling Salesman Problem.
//!
//! # Pipeline
//!
//! - Convex hull by Andrew's monotone chain, with an optional observer for
//!   the intermediate chain states
//! - Convex-Hull seeded Nearest Neighbor construction (CH-NN)
//! - First-improvement 2-opt refinement with full restart
//! - Benchmarking and visualization tools
//!
//! # Example
//!
//! ```
//! use chnn_tsp::geometry::Point;
//! use chnn_tsp::instance::TspInstance;
//! use chnn_tsp::solver::ChnnSolver;
//!
//! let instance = TspInstance::new("square", vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(1.0, 0.0),
//!     Point::new(1.0, 1.0),
//!     Point::new(0.0, 1.0),
//! ]);
//!
//! let solution = ChnnSolver::new().solve(&instance);
//! assert_eq!(solution.tour, vec![0, 1, 2, 3]);
//! println!("Solution cost: {:.2}", solution.cost);
//! ```

pub mod geometry;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod solver;
pub mod benchmark;
pub mod visualization;

pub use geometry::Point;
pub use instance::TspInstance;
pub use solution::Solution;
pub use solver::ChnnSolver;
