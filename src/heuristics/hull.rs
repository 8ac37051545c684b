//! Convex hull by Andrew's monotone chain.
//!
//! The chains are built over point *indices* so that every hull vertex keeps
//! its identity in the original point set. The hull is returned in
//! counter-clockwise order without a repeated closing vertex. Points that are
//! collinear with a hull edge are excluded (the turn test pops on zero).
//!
//! Every scan step can be reported to a [`HullObserver`], which receives the
//! whole chain after the step. The result never depends on the observer.

use crate::geometry::{orientation, Orientation, Point};
use ordered_float::OrderedFloat;

/// Receives the chain state after each scan step
pub trait HullObserver {
    fn on_upper_step(&mut self, _chain: &[usize]) {}
    fn on_lower_step(&mut self, _chain: &[usize]) {}
}

/// Observer that ignores every step
pub struct NoopObserver;

impl HullObserver for NoopObserver {}

/// Records a snapshot of each chain after every step
#[derive(Debug, Clone, Default)]
pub struct StepRecorder {
    pub upper_steps: Vec<Vec<usize>>,
    pub lower_steps: Vec<Vec<usize>>,
}

impl StepRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper chain snapshots resolved to coordinates
    pub fn upper_points(&self, points: &[Point]) -> Vec<Vec<Point>> {
        resolve(&self.upper_steps, points)
    }

    /// Lower chain snapshots resolved to coordinates
    pub fn lower_points(&self, points: &[Point]) -> Vec<Vec<Point>> {
        resolve(&self.lower_steps, points)
    }
}

impl HullObserver for StepRecorder {
    fn on_upper_step(&mut self, chain: &[usize]) {
        self.upper_steps.push(chain.to_vec());
    }

    fn on_lower_step(&mut self, chain: &[usize]) {
        self.lower_steps.push(chain.to_vec());
    }
}

fn resolve(steps: &[Vec<usize>], points: &[Point]) -> Vec<Vec<Point>> {
    steps
        .iter()
        .map(|step| step.iter().map(|&i| points[i]).collect())
        .collect()
}

/// Hull vertices as indices into the point set, counter-clockwise
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvexHull {
    pub vertices: Vec<usize>,
}

impl ConvexHull {
    /// Compute the hull without observing the scan
    pub fn compute(points: &[Point]) -> Self {
        Self::compute_observed(points, &mut NoopObserver)
    }

    /// Compute the hull, reporting every scan step to `observer`.
    /// Fewer than 3 points give an empty hull and no steps.
    pub fn compute_observed<O: HullObserver + ?Sized>(points: &[Point], observer: &mut O) -> Self {
        let n = points.len();
        if n < 3 {
            return ConvexHull::default();
        }

        let mut sorted: Vec<usize> = (0..n).collect();
        sorted.sort_by_key(|&i| lexicographic(&points[i]));

        let mut upper = chain(points, sorted.iter().copied(), |c| observer.on_upper_step(c));
        let mut lower = chain(points, sorted.iter().rev().copied(), |c| observer.on_lower_step(c));

        // each chain ends where the other begins
        upper.pop();
        lower.pop();
        upper.extend(lower);

        log::debug!("Convex hull: {} of {} points", upper.len(), n);
        ConvexHull { vertices: upper }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Hull vertices resolved to coordinates
    pub fn points(&self, points: &[Point]) -> Vec<Point> {
        self.vertices.iter().map(|&i| points[i]).collect()
    }

    /// True when `p` lies inside or on the boundary of the hull polygon.
    /// Degenerate hulls (fewer than 3 vertices) contain only points on their
    /// segment.
    pub fn contains(&self, points: &[Point], p: &Point) -> bool {
        let hull = self.points(points);
        match hull.len() {
            0 => false,
            1 => hull[0] == *p,
            2 => {
                orientation(&hull[0], &hull[1], p) == Orientation::Collinear
                    && p.x >= hull[0].x.min(hull[1].x)
                    && p.x <= hull[0].x.max(hull[1].x)
                    && p.y >= hull[0].y.min(hull[1].y)
                    && p.y <= hull[0].y.max(hull[1].y)
            }
            len => (0..len).all(|k| {
                orientation(&hull[k], &hull[(k + 1) % len], p) != Orientation::Right
            }),
        }
    }
}

/// `computeConvexHull`: the hull as coordinates, counter-clockwise
pub fn compute_convex_hull(points: &[Point]) -> Vec<Point> {
    ConvexHull::compute(points).points(points)
}

/// Sort key by x, then y. Total even for NaN, which sorts last.
fn lexicographic(p: &Point) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
    (OrderedFloat(p.x), OrderedFloat(p.y))
}

/// One monotone scan. Pops while the last two chain points and the incoming
/// point fail to make a strict left turn.
fn chain<I, F>(points: &[Point], order: I, mut on_step: F) -> Vec<usize>
where
    I: Iterator<Item = usize>,
    F: FnMut(&[usize]),
{
    let mut hull: Vec<usize> = Vec::new();
    for idx in order {
        while hull.len() >= 2
            && orientation(
                &points[hull[hull.len() - 2]],
                &points[hull[hull.len() - 1]],
                &points[idx],
            ) != Orientation::Left
        {
            hull.pop();
        }
        hull.push(idx);
        on_step(&hull);
    }
    hull
}
