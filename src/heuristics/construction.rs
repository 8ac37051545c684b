use crate::heuristics::hull::ConvexHull;
use crate::instance::TspInstance;
use crate::solution::Solution;
use ordered_float::OrderedFloat;

pub trait ConstructionHeuristic {
    fn construct(&self, instance: &TspInstance) -> Solution;
    fn name(&self) -> &str;
}

/// Convex-Hull seeded Nearest Neighbor (CH-NN)
///
/// Starts from the hull boundary in hull order, then repeatedly appends the
/// unvisited point nearest to the last appended one. Ties go to the lowest
/// index.
pub struct ConvexHullNearestNeighbor;

impl ConvexHullNearestNeighbor {
    pub fn new() -> Self {
        ConvexHullNearestNeighbor
    }

    /// Build the tour from a precomputed hull.
    /// An empty hull (n < 3) falls back to the identity order.
    pub fn build_tour(&self, instance: &TspInstance, hull: &ConvexHull) -> Vec<usize> {
        let n = instance.dimension();
        if hull.is_empty() {
            return (0..n).collect();
        }

        let mut tour = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        let mut visited_count = 0;

        for &v in &hull.vertices {
            tour.push(v);
            visited[v] = true;
            visited_count += 1;
        }

        let mut current = hull.vertices[hull.len() - 1];
        while visited_count < n {
            let next = find_nearest(instance, current, &visited)
                .expect("an unvisited point remains while the tour is incomplete");
            tour.push(next);
            visited[next] = true;
            visited_count += 1;
            current = next;
        }

        tour
    }
}

impl Default for ConvexHullNearestNeighbor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for ConvexHullNearestNeighbor {
    fn construct(&self, instance: &TspInstance) -> Solution {
        let start = std::time::Instant::now();

        let hull = ConvexHull::compute(&instance.points);
        let tour = self.build_tour(instance, &hull);

        let mut solution = Solution::from_tour(instance, tour, self.name());
        solution.hull = hull.vertices;
        solution.computation_time = start.elapsed().as_secs_f64();
        solution
    }

    fn name(&self) -> &str {
        "CH-NN"
    }
}

/// Nearest unvisited point to `current`; the first index wins on ties
fn find_nearest(instance: &TspInstance, current: usize, visited: &[bool]) -> Option<usize> {
    (0..instance.dimension())
        .filter(|&i| !visited[i])
        .min_by_key(|&i| OrderedFloat(instance.distance(current, i)))
}

/// `buildInitialTour`: CH-NN tour seeded with `hull`
pub fn build_initial_tour(instance: &TspInstance, hull: &ConvexHull) -> Vec<usize> {
    ConvexHullNearestNeighbor::new().build_tour(instance, hull)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::heuristics::local_search::refine_tour;
    use crate::solution::is_permutation;
    use proptest::prelude::*;

    fn instance(coords: &[(f64, f64)]) -> TspInstance {
        TspInstance::new("test", coords.iter().map(|&c| Point::from(c)).collect())
    }

    #[test]
    fn test_square_tour_follows_hull() {
        let inst = instance(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let sol = ConvexHullNearestNeighbor::new().construct(&inst);
        assert_eq!(sol.tour, vec![0, 1, 2, 3]);
        assert_eq!(sol.hull, vec![0, 1, 2, 3]);
        assert!((sol.cost - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_small_instances_use_identity() {
        let two = instance(&[(0.0, 0.0), (1.0, 1.0)]);
        let sol = ConvexHullNearestNeighbor::new().construct(&two);
        assert_eq!(sol.tour, vec![0, 1]);
        assert!(sol.hull.is_empty());
        assert!((sol.cost - 2.0 * 2f64.sqrt()).abs() < 1e-12);

        let one = instance(&[(3.0, 3.0)]);
        assert_eq!(ConvexHullNearestNeighbor::new().construct(&one).tour, vec![0]);

        let none = instance(&[]);
        assert!(ConvexHullNearestNeighbor::new().construct(&none).tour.is_empty());
    }

    #[test]
    fn test_collinear_visits_everything() {
        let inst = instance(&[(2.0, 0.0), (0.0, 0.0), (4.0, 0.0), (1.0, 0.0), (3.0, 0.0)]);
        let sol = ConvexHullNearestNeighbor::new().construct(&inst);
        assert_eq!(sol.tour, vec![1, 2, 4, 0, 3]);
        assert!((sol.cost - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_neighbor_from_last_hull_vertex() {
        // hull (0,0) (10,0) (10,10) (0,10); interior points visited nearest-first from (0,10)
        let inst = instance(&[
            (0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0),
            (5.0, 5.0), (1.0, 9.0), (9.0, 1.0),
        ]);
        let hull = ConvexHull::compute(&inst.points);
        let tour = build_initial_tour(&inst, &hull);
        assert_eq!(tour, vec![0, 1, 2, 3, 5, 4, 6]);
    }

    #[test]
    fn test_ties_prefer_lowest_index() {
        // from (0,2) both (1,1.5) and (-1,1.5) are equally near
        let inst = instance(&[(-5.0, 0.0), (5.0, 0.0), (0.0, 2.0), (1.0, 1.5), (-1.0, 1.5)]);
        let hull = ConvexHull::compute(&inst.points);
        assert_eq!(hull.vertices, vec![0, 1, 2]);
        let tour = build_initial_tour(&inst, &hull);
        assert_eq!(tour, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_shared_coordinates_stay_distinct() {
        // index 4 repeats hull vertex (0,0); 5, 6 and 7 share (2,2)
        let inst = instance(&[
            (0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0),
            (0.0, 0.0), (2.0, 2.0), (2.0, 2.0), (2.0, 2.0),
        ]);
        let hull = ConvexHull::compute(&inst.points);
        assert_eq!(hull.vertices, vec![0, 1, 2, 3]);

        let tour = build_initial_tour(&inst, &hull);
        assert_eq!(tour, vec![0, 1, 2, 3, 5, 6, 7, 4]);

        let refined = refine_tour(&inst, &tour);
        assert!(is_permutation(&refined, 8));
        assert!(inst.tour_length(&refined) <= inst.tour_length(&tour));
    }

    proptest! {
        #[test]
        fn prop_construction_is_permutation(
            coords in proptest::collection::vec((-5i32..5, -5i32..5), 0..60)
        ) {
            // a small grid forces repeated coordinates
            let inst = TspInstance::new(
                "p",
                coords.iter().map(|&(x, y)| Point::new(x as f64, y as f64)).collect(),
            );
            let sol = ConvexHullNearestNeighbor::new().construct(&inst);
            prop_assert!(is_permutation(&sol.tour, inst.dimension()));
            prop_assert!(is_permutation(&refine_tour(&inst, &sol.tour), inst.dimension()));
        }
    }
}
