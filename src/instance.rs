//! Module for loading and representing planar TSP instances.
//!
//! An instance is an ordered list of points; a point's identity is its index.
//! Files may be written in tuple form (`(x,y)` or `{x, y},` per line), as bare
//! `x y` pairs, or as TSP-LIB files with a `NODE_COORD_SECTION`.

use crate::geometry::{distance, Point};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A named planar point set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Comment/description
    pub comment: String,
    /// Points, indexed 0..n-1
    pub points: Vec<Point>,
}

#[derive(PartialEq)]
enum Section {
    None,
    Coords,
    Other,
}

impl TspInstance {
    pub fn new(name: &str, points: Vec<Point>) -> Self {
        TspInstance {
            name: name.to_string(),
            comment: String::new(),
            points,
        }
    }

    /// Number of points
    pub fn dimension(&self) -> usize {
        self.points.len()
    }

    /// Load an instance from a file. The file stem is used as the name unless
    /// the file carries a `NAME:` header.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| format!("Cannot open file {:?}: {}", path, e))?;
        let reader = BufReader::new(file);

        let default_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut lines = Vec::new();
        for line in reader.lines() {
            lines.push(line.map_err(|e| format!("Read error: {}", e))?);
        }

        let instance = Self::parse_lines(&default_name, lines.iter().map(|l| l.as_str()))?;
        log::debug!("Loaded {} points from {:?}", instance.dimension(), path);
        Ok(instance)
    }

    /// Parse an instance from in-memory text
    pub fn parse(name: &str, text: &str) -> Result<Self, String> {
        Self::parse_lines(name, text.lines())
    }

    fn parse_lines<'a, I>(default_name: &str, lines: I) -> Result<Self, String>
    where
        I: Iterator<Item = &'a str>,
    {
        let mut name = default_name.to_string();
        let mut comment = String::new();
        let mut dimension: Option<usize> = None;
        let mut points = Vec::new();
        let mut section = Section::None;

        for (number, raw) in lines.enumerate() {
            let line_no = number + 1;
            let line = raw.trim();

            if line.is_empty() || line == "EOF" || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix("NAME") {
                name = rest.trim_start_matches([' ', ':']).trim().to_string();
                continue;
            }
            if let Some(rest) = line.strip_prefix("COMMENT") {
                comment = rest.trim_start_matches([' ', ':']).trim().to_string();
                continue;
            }
            if let Some(rest) = line.strip_prefix("DIMENSION") {
                dimension = Some(
                    rest.trim_start_matches([' ', ':']).trim()
                        .parse()
                        .map_err(|_| format!("line {}: invalid dimension", line_no))?,
                );
                continue;
            }
            if line.starts_with("NODE_COORD_SECTION") {
                section = Section::Coords;
                continue;
            }
            if line.ends_with("_SECTION") {
                section = Section::Other;
                continue;
            }
            if line.starts_with(|c: char| c.is_ascii_alphabetic()) && line.contains(':') {
                // other TSP-LIB headers (TYPE, EDGE_WEIGHT_TYPE, ...)
                continue;
            }

            let point = match section {
                Section::Coords => {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if parts.len() < 3 {
                        return Err(format!("line {}: expected 'id x y', got '{}'", line_no, line));
                    }
                    let x: f64 = parts[1].parse()
                        .map_err(|_| format!("line {}: invalid x coordinate", line_no))?;
                    let y: f64 = parts[2].parse()
                        .map_err(|_| format!("line {}: invalid y coordinate", line_no))?;
                    Point::new(x, y)
                }
                Section::None => parse_point(line)
                    .ok_or_else(|| format!("line {}: invalid point '{}'", line_no, line))?,
                Section::Other => continue,
            };

            if !point.x.is_finite() || !point.y.is_finite() {
                return Err(format!("line {}: non-finite coordinate in '{}'", line_no, line));
            }
            points.push(point);
        }

        if let Some(dim) = dimension {
            if dim != points.len() {
                log::warn!("DIMENSION is {} but {} coordinates were read", dim, points.len());
            }
        }

        Ok(TspInstance { name, comment, points })
    }

    /// Draw `n` uniform points in `[0, extent)^2`. Deterministic via seed.
    pub fn random(n: usize, seed: u64, extent: f64) -> Self {
        use rand::prelude::*;
        use rand_chacha::ChaCha8Rng;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let points = (0..n)
            .map(|_| Point::new(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent)))
            .collect();

        let mut instance = TspInstance::new(&format!("random{}-s{}", n, seed), points);
        instance.comment = format!("{} uniform points in [0, {})^2", n, extent);
        instance
    }

    /// Distance between the points at two indices
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        distance(&self.points[i], &self.points[j])
    }

    /// Closed tour length: consecutive distances plus the closing edge
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }

        let mut length = 0.0;
        for i in 0..tour.len() - 1 {
            length += self.distance(tour[i], tour[i + 1]);
        }

        length += self.distance(tour[tour.len() - 1], tour[0]);

        length
    }

    /// Points in tour order
    pub fn tour_points(&self, tour: &[usize]) -> Vec<Point> {
        tour.iter().map(|&i| self.points[i]).collect()
    }

    /// One `(x, y)` line per point, the form the tuple parser reads back
    pub fn to_tuple_format(&self) -> String {
        let mut out = String::new();
        for p in &self.points {
            out.push_str(&format!("({}, {})\n", p.x, p.y));
        }
        out
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let n = self.dimension();

        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in &self.points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        if n == 0 {
            min_x = 0.0;
            max_x = 0.0;
            min_y = 0.0;
            max_y = 0.0;
        }

        let mut sum = 0.0;
        let mut pairs = 0usize;
        let mut max_distance: f64 = 0.0;
        let mut duplicates = 0usize;
        for i in 0..n {
            for j in i + 1..n {
                let d = self.distance(i, j);
                sum += d;
                pairs += 1;
                max_distance = max_distance.max(d);
                if d == 0.0 {
                    duplicates += 1;
                }
            }
        }
        let avg_distance = if pairs > 0 { sum / pairs as f64 } else { 0.0 };

        InstanceStatistics {
            name: self.name.clone(),
            dimension: n,
            min_x,
            max_x,
            min_y,
            max_y,
            avg_distance,
            max_distance,
            duplicate_pairs: duplicates,
        }
    }
}

/// Parse `(x,y)`, `{x, y},`, `x,y` or `x y`
fn parse_point(line: &str) -> Option<Point> {
    let cleaned: String = line
        .chars()
        .map(|c| match c {
            '(' | ')' | '{' | '}' | '[' | ']' | ',' | ';' => ' ',
            c => c,
        })
        .collect();

    let mut parts = cleaned.split_whitespace();
    let x: f64 = parts.next()?.parse().ok()?;
    let y: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Point::new(x, y))
}

/// Statistics about an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
    /// Pairs of points sharing the same coordinates
    pub duplicate_pairs: usize,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Points: {}", self.dimension)?;
        writeln!(f, "  X range: [{:.2}, {:.2}]", self.min_x, self.max_x)?;
        writeln!(f, "  Y range: [{:.2}, {:.2}]", self.min_y, self.max_y)?;
        writeln!(f, "  Duplicate pairs: {}", self.duplicate_pairs)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}
