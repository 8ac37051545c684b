//! Solution representation and manipulation for the planar TSP.
//!
//! A tour is a permutation of point indices read as a cycle: the edge after
//! the last position wraps back to the first.

use crate::instance::TspInstance;
use serde::{Deserialize, Serialize};

/// Represents a solution to a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a sequence of point indices
    pub tour: Vec<usize>,
    /// Closed tour length
    pub cost: f64,
    /// Tour length before refinement
    pub initial_cost: f64,
    /// Hull vertex indices that seeded the tour (empty when n < 3)
    pub hull: Vec<usize>,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of applied improving moves (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            tour: Vec::new(),
            cost: 0.0,
            initial_cost: 0.0,
            hull: Vec::new(),
            algorithm: String::new(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Create a solution from a tour
    pub fn from_tour(instance: &TspInstance, tour: Vec<usize>, algorithm: &str) -> Self {
        let cost = instance.tour_length(&tour);
        Solution {
            tour,
            cost,
            initial_cost: cost,
            hull: Vec::new(),
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Recompute the cost from the tour
    pub fn validate(&mut self, instance: &TspInstance) {
        self.cost = instance.tour_length(&self.tour);
    }

    /// Check if all points are visited exactly once
    pub fn is_complete(&self, instance: &TspInstance) -> bool {
        is_permutation(&self.tour, instance.dimension())
    }

    /// Relative improvement of `cost` over `initial_cost`, in percent
    pub fn improvement_percent(&self) -> f64 {
        if self.initial_cost > 0.0 {
            (self.initial_cost - self.cost) / self.initial_cost * 100.0
        } else {
            0.0
        }
    }

    /// Console layout: indices joined by ` -> `, ten per line
    pub fn format_tour(&self) -> String {
        let mut out = String::new();
        for (count, node) in self.tour.iter().enumerate() {
            if count % 10 == 0 {
                out.push('\n');
            }
            out.push_str(&node.to_string());
            if count + 1 != self.tour.len() {
                out.push_str(" -> ");
            }
        }
        out
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.2}", self.cost)?;
        writeln!(f, "  Initial cost: {:.2}", self.initial_cost)?;
        writeln!(f, "  Hull size: {}", self.hull.len())?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}

/// Cost change of reversing positions `i+1..=j` of a closed tour. Only the
/// two edges leaving positions `i` and `j` change.
pub fn two_opt_delta(instance: &TspInstance, tour: &[usize], i: usize, j: usize) -> f64 {
    let n = tour.len();
    if i >= j || j >= n {
        return 0.0;
    }

    let a = tour[i];
    let b = tour[(i + 1) % n];
    let c = tour[j];
    let d = tour[(j + 1) % n];

    let old = instance.distance(a, b) + instance.distance(c, d);
    let new = instance.distance(a, c) + instance.distance(b, d);
    new - old
}

/// Apply a 2-opt move (reverse segment between i+1 and j)
pub fn apply_two_opt(tour: &mut [usize], i: usize, j: usize) {
    tour[i + 1..=j].reverse();
}

/// True when `tour` holds every index in `0..n` exactly once
pub fn is_permutation(tour: &[usize], n: usize) -> bool {
    if tour.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &node in tour {
        if node >= n || seen[node] {
            return false;
        }
        seen[node] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn square() -> TspInstance {
        TspInstance::new(
            "square",
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 1.0)],
        )
    }

    #[test]
    fn test_solution_creation() {
        let sol = Solution::new();
        assert!(sol.tour.is_empty());
        assert_eq!(sol.cost, 0.0);
        assert!(sol.iterations.is_none());
    }

    #[test]
    fn test_is_permutation() {
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(is_permutation(&[], 0));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 1, 3], 3));
        assert!(!is_permutation(&[0, 1], 3));
    }

    #[test]
    fn test_two_opt_delta_matches_full_recompute() {
        let instance = square();
        // crossing tour 0 -> 2 -> 1 -> 3
        let sol = Solution::from_tour(&instance, vec![0, 2, 1, 3], "test");
        let delta = two_opt_delta(&instance, &sol.tour, 0, 2);
        assert!(delta < 0.0);

        let mut moved = sol.clone();
        apply_two_opt(&mut moved.tour, 0, 2);
        moved.validate(&instance);
        assert!(moved.is_complete(&instance));

        assert!((moved.cost - sol.cost - delta).abs() < 1e-12);
        assert_eq!(moved.tour, vec![0, 1, 2, 3]);
        assert!((moved.cost - 4.0).abs() < 1e-12);

        // closing edge: reversing up to the last position
        let wrap = two_opt_delta(&instance, &moved.tour, 1, 3);
        let mut wrapped = moved.tour.clone();
        apply_two_opt(&mut wrapped, 1, 3);
        assert!((instance.tour_length(&wrapped) - moved.cost - wrap).abs() < 1e-12);
        assert_eq!(two_opt_delta(&instance, &moved.tour, 2, 2), 0.0);
    }

    #[test]
    fn test_format_tour_wraps_every_ten() {
        let instance = TspInstance::random(12, 1, 10.0);
        let sol = Solution::from_tour(&instance, (0..12).collect(), "test");
        let text = sol.format_tour();
        assert_eq!(text.lines().filter(|l| !l.is_empty()).count(), 2);
        assert!(text.ends_with("11"));
        assert!(text.contains("0 -> 1 -> "));
    }
}
