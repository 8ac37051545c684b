//! Visualization utilities for TSP solutions.
//!
//! Generates SVG plots of tours with their hull, and plain-text exports of
//! the tour and hull construction steps for external plotting.

use crate::geometry::Point;
use crate::instance::TspInstance;
use crate::solution::Solution;
use std::fs::File;
use std::io::Write;
use std::path::Path;
#[cfg(not(feature = "png"))]
use std::process::Command;
#[cfg(feature = "png")]
use resvg::usvg;
#[cfg(feature = "png")]
use resvg::render;
#[cfg(feature = "png")]
use resvg::FitTo;
#[cfg(feature = "png")]
use resvg::tiny_skia::{Pixmap, Transform};
#[cfg(feature = "png")]
use resvg::usvg::TreeParsing;

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Node radius
    pub node_radius: f64,
    /// Draw point indices next to nodes
    pub labels: bool,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 4.0,
            labels: false,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate SVG of a solution: hull polygon, tour edges, then nodes
    pub fn generate_svg(&self, instance: &TspInstance, solution: &Solution) -> String {
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = bounds(&instance.points);

        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1.0);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1.0);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .node {{ fill: #3498db; stroke: #2c3e50; stroke-width: 1; }}
    .hull-node {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 1; }}
    .hull {{ stroke: #e74c3c; stroke-width: 1; stroke-dasharray: 6,4; fill: #e74c3c; fill-opacity: 0.05; }}
    .edge {{ stroke: #34495e; stroke-width: 2; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Instance: {} | n = {} | Hull: {} | Cost: {:.2}</text>
"##,
            self.margin,
            instance.name,
            instance.dimension(),
            solution.hull.len(),
            solution.cost
        ));

        let transform = |p: &Point| -> (f64, f64) {
            let tx = self.margin + (p.x - min_x) * scale;
            let ty = self.height - self.margin - (p.y - min_y) * scale;
            (tx, ty)
        };

        if solution.hull.len() > 1 {
            let coords: Vec<String> = solution
                .hull
                .iter()
                .map(|&i| {
                    let (x, y) = transform(&instance.points[i]);
                    format!("{:.2},{:.2}", x, y)
                })
                .collect();
            svg.push_str(&format!(
                r#"<polygon points="{}" class="hull"/>
"#,
                coords.join(" ")
            ));
        }

        if solution.tour.len() > 1 {
            for i in 0..solution.tour.len() {
                let from = solution.tour[i];
                let to = solution.tour[(i + 1) % solution.tour.len()];

                let (x1, y1) = transform(&instance.points[from]);
                let (x2, y2) = transform(&instance.points[to]);

                svg.push_str(&format!(
                    r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge"/>
"#,
                    x1, y1, x2, y2
                ));
            }
        }

        let mut on_hull = vec![false; instance.dimension()];
        for &v in &solution.hull {
            on_hull[v] = true;
        }

        for (id, p) in instance.points.iter().enumerate() {
            let (x, y) = transform(p);
            let class = if on_hull[id] { "hull-node" } else { "node" };

            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                x, y, self.node_radius, class
            ));

            if self.labels {
                svg.push_str(&format!(
                    r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                    x, y - self.node_radius - 3.0, id
                ));
            }
        }

        svg.push_str("</svg>");

        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }

    /// Save SVG as PNG. Uses resvg with the `png` feature, otherwise tries
    /// `rsvg-convert`, then `magick convert`, then `inkscape`.
    pub fn save_png<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        #[cfg(feature = "png")]
        let result = self.render_png(svg, path.as_ref());
        #[cfg(not(feature = "png"))]
        let result = self.convert_externally(svg, path.as_ref());
        result
    }

    #[cfg(not(feature = "png"))]
    fn convert_externally(&self, svg: &str, path: &Path) -> std::io::Result<()> {
        let tmp_svg = path.with_extension("svg.tmp");
        self.save_svg(svg, &tmp_svg)?;

        let out = path.to_string_lossy().to_string();
        let tmp = tmp_svg.to_string_lossy().to_string();
        let converters: [(&str, Vec<&str>); 3] = [
            ("rsvg-convert", vec!["-o", out.as_str(), tmp.as_str()]),
            ("magick", vec!["convert", tmp.as_str(), out.as_str()]),
            ("inkscape", vec![tmp.as_str(), "--export-type=png", "--export-filename", out.as_str()]),
        ];

        for (program, args) in converters.iter() {
            if let Ok(status) = Command::new(program).args(args).status() {
                if status.success() {
                    remove_temp(&tmp_svg);
                    return Ok(());
                }
            }
            log::debug!("{} unavailable or failed", program);
        }

        remove_temp(&tmp_svg);
        Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "No SVG->PNG converter succeeded (tried rsvg-convert, magick, inkscape)",
        ))
    }

    #[cfg(feature = "png")]
    fn render_png(&self, svg: &str, path: &Path) -> std::io::Result<()> {
        let err = |msg: String| std::io::Error::new(std::io::ErrorKind::Other, msg);

        let opt = usvg::Options::default();
        let rtree = usvg::Tree::from_str(svg, &opt).map_err(|e| err(format!("usvg parse error: {}", e)))?;
        let mut pixmap = Pixmap::new(self.width.max(1.0) as u32, self.height.max(1.0) as u32)
            .ok_or_else(|| err("Failed to create pixmap".to_string()))?;
        render(&rtree, FitTo::Original, Transform::default(), pixmap.as_mut())
            .ok_or_else(|| err("resvg render failed".to_string()))?;
        pixmap.save_png(path).map_err(|e| err(format!("save_png failed: {}", e)))
    }
}

#[cfg(not(feature = "png"))]
fn remove_temp(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        log::debug!("could not remove {:?}: {}", path, e);
    }
}

/// Get coordinate bounds
fn bounds(points: &[Point]) -> (f64, f64, f64, f64) {
    if points.is_empty() {
        return (0.0, 1.0, 0.0, 1.0);
    }

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    (min_x, max_x, min_y, max_y)
}

/// Tour coordinates, one `x y` line per visited point
pub fn export_tour(instance: &TspInstance, solution: &Solution) -> String {
    let mut data = String::new();
    for p in instance.tour_points(&solution.tour) {
        data.push_str(&format!("{} {}\n", p.x, p.y));
    }
    data
}

/// Hull scan snapshots: `x y` lines per snapshot, each followed by a blank line
pub fn export_hull_steps(steps: &[Vec<Point>]) -> String {
    let mut data = String::new();
    for step in steps {
        for p in step {
            data.push_str(&format!("{} {}\n", p.x, p.y));
        }
        data.push('\n');
    }
    data
}

/// Export data for external plotting (e.g., matplotlib)
pub fn export_plot_data(instance: &TspInstance, solution: &Solution) -> String {
    let mut data = String::new();

    data.push_str("# TSP Solution Data\n");
    data.push_str(&format!("# Instance: {}\n", instance.name));
    data.push_str(&format!("# Cost: {:.2}\n\n", solution.cost));

    data.push_str("# Points: id, x, y\n");
    for (id, p) in instance.points.iter().enumerate() {
        data.push_str(&format!("{},{},{}\n", id, p.x, p.y));
    }

    data.push_str("\n# Hull: sequence of point ids\n");
    let hull_str: Vec<String> = solution.hull.iter().map(|n| n.to_string()).collect();
    data.push_str(&hull_str.join(","));
    data.push('\n');

    data.push_str("\n# Tour: sequence of point ids\n");
    let tour_str: Vec<String> = solution.tour.iter().map(|n| n.to_string()).collect();
    data.push_str(&tour_str.join(","));
    data.push('\n');

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::hull::{ConvexHull, StepRecorder};
    use crate::solver::ChnnSolver;

    fn create_test_instance() -> TspInstance {
        TspInstance::new(
            "test",
            vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(2.0, 2.0), Point::new(1.0, 1.0)],
        )
    }

    #[test]
    fn test_visualizer() {
        let instance = create_test_instance();
        let solution = ChnnSolver::new().solve(&instance);

        let viz = Visualizer::new();
        let svg = viz.generate_svg(&instance, &solution);

        assert!(svg.contains("svg"));
        assert!(svg.contains("test"));
        assert!(svg.contains("<polygon"));
        assert_eq!(svg.matches("<line").count(), 4);
        assert_eq!(svg.matches("<circle").count(), 4);
    }

    #[test]
    fn test_visualizer_empty_instance() {
        let instance = TspInstance::new("empty", Vec::new());
        let svg = Visualizer::new().generate_svg(&instance, &Solution::new());
        assert!(svg.ends_with("</svg>"));
        assert!(!svg.contains("<line"));
    }

    #[test]
    #[cfg(not(feature = "png"))]
    fn test_remove_temp() {
        let path = std::env::temp_dir().join(format!("chnn-viz-{}.svg.tmp", std::process::id()));
        std::fs::write(&path, "<svg/>").unwrap();
        remove_temp(&path);
        assert!(!path.exists());
        // a second removal only logs
        remove_temp(&path);
    }

    #[test]
    fn test_export_tour() {
        let instance = create_test_instance();
        let solution = Solution::from_tour(&instance, vec![0, 1, 2, 3], "test");
        assert_eq!(export_tour(&instance, &solution), "0 0\n2 0\n2 2\n1 1\n");
    }

    #[test]
    fn test_export_hull_steps() {
        let instance = create_test_instance();
        let mut recorder = StepRecorder::new();
        ConvexHull::compute_observed(&instance.points, &mut recorder);

        let text = export_hull_steps(&recorder.upper_points(&instance.points));
        // one blank separator per snapshot
        assert_eq!(text.matches("\n\n").count(), recorder.upper_steps.len());
        assert!(text.starts_with("0 0\n\n0 0\n"));
    }

    #[test]
    fn test_export_plot_data() {
        let instance = create_test_instance();
        let solution = ChnnSolver::new().solve(&instance);
        let data = export_plot_data(&instance, &solution);
        assert!(data.contains("# Instance: test"));
        assert!(data.contains("3,1,1"));
    }
}
