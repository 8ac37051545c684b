//! Local search improvement heuristics.
//!
//! 2-opt with first improvement: a pass scans position pairs `(i, j)` with
//! `i < j`, applies the first strictly improving segment reversal and starts
//! over from `i = 0`. The search ends after a pass with no improving move, or
//! when the optional pass cap is reached.

use crate::instance::TspInstance;
use crate::solution::{apply_two_opt, two_opt_delta, Solution};

/// Trait for local search improvement methods
pub trait LocalSearch {
    fn improve(&self, instance: &TspInstance, solution: &mut Solution) -> bool;
    fn name(&self) -> &str;
}

/// First-improvement 2-opt with full restart
#[derive(Debug, Clone, Default)]
pub struct TwoOptSearch {
    /// Upper bound on the number of passes; `None` runs to a local optimum
    pub max_passes: Option<usize>,
}

impl TwoOptSearch {
    pub fn new() -> Self {
        TwoOptSearch { max_passes: None }
    }

    pub fn with_max_passes(max_passes: usize) -> Self {
        TwoOptSearch {
            max_passes: Some(max_passes),
        }
    }

    /// Refine `tour` in place and return the number of applied swaps
    pub fn refine(&self, instance: &TspInstance, tour: &mut [usize]) -> usize {
        if tour.len() < 2 {
            return 0;
        }

        let mut swaps = 0;
        let mut passes = 0;
        loop {
            if let Some(cap) = self.max_passes {
                if passes >= cap {
                    log::debug!("2-opt stopped at pass cap {}", cap);
                    break;
                }
            }
            passes += 1;

            match first_improving_move(instance, tour) {
                Some((i, j)) => {
                    apply_two_opt(tour, i, j);
                    swaps += 1;
                }
                None => break,
            }
        }

        log::debug!("2-opt applied {} swaps over {} passes", swaps, passes);
        swaps
    }
}

/// First `(i, j)` in scan order whose reversal strictly shortens the tour
fn first_improving_move(instance: &TspInstance, tour: &[usize]) -> Option<(usize, usize)> {
    let n = tour.len();
    for i in 0..n - 1 {
        for j in i + 1..n {
            if two_opt_delta(instance, tour, i, j) < 0.0 {
                return Some((i, j));
            }
        }
    }
    None
}

impl LocalSearch for TwoOptSearch {
    fn improve(&self, instance: &TspInstance, solution: &mut Solution) -> bool {
        let swaps = self.refine(instance, &mut solution.tour);
        solution.iterations = Some(swaps);
        solution.validate(instance);
        swaps > 0
    }

    fn name(&self) -> &str {
        "2-Opt-FI"
    }
}

/// `refineTour`: uncapped 2-opt over a copy of `tour`
pub fn refine_tour(instance: &TspInstance, tour: &[usize]) -> Vec<usize> {
    let mut refined = tour.to_vec();
    TwoOptSearch::new().refine(instance, &mut refined);
    refined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::heuristics::construction::{ConstructionHeuristic, ConvexHullNearestNeighbor};
    use crate::solution::is_permutation;
    use proptest::prelude::*;

    fn square() -> TspInstance {
        TspInstance::new(
            "square",
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 1.0)],
        )
    }

    #[test]
    fn test_optimal_square_is_unchanged() {
        let instance = square();
        let mut sol = Solution::from_tour(&instance, vec![0, 1, 2, 3], "test");
        let improved = TwoOptSearch::new().improve(&instance, &mut sol);
        assert!(!improved);
        assert_eq!(sol.tour, vec![0, 1, 2, 3]);
        assert_eq!(sol.iterations, Some(0));
        assert!((sol.cost - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_crossing_is_removed() {
        let instance = square();
        let refined = refine_tour(&instance, &[0, 2, 1, 3]);
        assert!(is_permutation(&refined, 4));
        assert!((instance.tour_length(&refined) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_improvement_order() {
        let instance = square();
        let mut tour = vec![0, 2, 1, 3];
        assert_eq!(first_improving_move(&instance, &tour), Some((0, 2)));
        tour[1..=2].reverse();
        assert_eq!(first_improving_move(&instance, &tour), None);
    }

    #[test]
    fn test_short_tours_untouched() {
        let instance = TspInstance::new("pair", vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert_eq!(refine_tour(&instance, &[0, 1]), vec![0, 1]);
        assert_eq!(refine_tour(&instance, &[1]), vec![1]);
        assert!(refine_tour(&instance, &[]).is_empty());
    }

    #[test]
    fn test_pass_cap_limits_swaps() {
        let instance = TspInstance::random(60, 3, 1000.0);
        let mut uncapped: Vec<usize> = (0..60).collect();
        let swaps = TwoOptSearch::new().refine(&instance, &mut uncapped);
        assert!(swaps > 1);

        let mut capped: Vec<usize> = (0..60).collect();
        let capped_swaps = TwoOptSearch::with_max_passes(1).refine(&instance, &mut capped);
        assert_eq!(capped_swaps, 1);
        assert!(is_permutation(&capped, 60));

        let mut none: Vec<usize> = (0..60).collect();
        assert_eq!(TwoOptSearch::with_max_passes(0).refine(&instance, &mut none), 0);
        assert_eq!(none, (0..60).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn prop_refinement_never_worsens(seed in 0u64..500, n in 0usize..40) {
            let instance = TspInstance::random(n, seed, 100.0);
            let initial = ConvexHullNearestNeighbor::new().construct(&instance);

            let mut refined = initial.clone();
            TwoOptSearch::new().improve(&instance, &mut refined);

            prop_assert!(is_permutation(&refined.tour, n));
            prop_assert!(refined.cost <= initial.cost + 1e-9);

            // a local optimum is a fixed point
            let again = refine_tour(&instance, &refined.tour);
            prop_assert_eq!(again, refined.tour);
        }
    }
}
