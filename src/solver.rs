//! CH-NN + 2-opt pipeline.
//!
//! points -> hull -> seed tour -> refined tour. The reported computation time
//! covers hull, construction and refinement.

use crate::heuristics::construction::ConvexHullNearestNeighbor;
use crate::heuristics::hull::{ConvexHull, HullObserver, NoopObserver};
use crate::heuristics::local_search::TwoOptSearch;
use crate::instance::TspInstance;
use crate::solution::Solution;
use std::time::Instant;

pub use crate::heuristics::construction::build_initial_tour;
pub use crate::heuristics::hull::compute_convex_hull;
pub use crate::heuristics::local_search::refine_tour;

#[derive(Debug, Clone, Default)]
pub struct ChnnSolver {
    pub two_opt: TwoOptSearch,
}

impl ChnnSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_passes(max_passes: Option<usize>) -> Self {
        ChnnSolver {
            two_opt: TwoOptSearch { max_passes },
        }
    }

    pub fn solve(&self, instance: &TspInstance) -> Solution {
        self.solve_observed(instance, &mut NoopObserver)
    }

    /// Run the pipeline, reporting hull scan steps to `observer`
    pub fn solve_observed<O: HullObserver + ?Sized>(
        &self,
        instance: &TspInstance,
        observer: &mut O,
    ) -> Solution {
        let start = Instant::now();

        let hull = ConvexHull::compute_observed(&instance.points, observer);
        let mut tour = ConvexHullNearestNeighbor::new().build_tour(instance, &hull);
        let initial_cost = instance.tour_length(&tour);

        let swaps = self.two_opt.refine(instance, &mut tour);

        let elapsed = start.elapsed().as_secs_f64();

        let mut solution = Solution::from_tour(instance, tour, "CH-NN + 2-Opt");
        solution.initial_cost = initial_cost;
        solution.hull = hull.vertices;
        solution.iterations = Some(swaps);
        solution.computation_time = elapsed;
        debug_assert!(solution.is_complete(instance), "tour is not a permutation");

        log::info!(
            "{}: n={} hull={} cost {:.2} -> {:.2} ({} swaps, {:.4}s)",
            instance.name,
            instance.dimension(),
            solution.hull.len(),
            initial_cost,
            solution.cost,
            swaps,
            elapsed
        );

        solution
    }
}
