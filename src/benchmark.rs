//! Benchmarking module.
//!
//! Runs the CH-NN + 2-opt pipeline repeatedly over a set of instances,
//! collects per-run timings and costs, and exports them as CSV tables and a
//! text report.

use crate::instance::TspInstance;
use crate::solver::ChnnSolver;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Result of one pipeline run on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Instance name
    pub instance: String,
    /// Number of points
    pub dimension: usize,
    /// Run number (0-based)
    pub run: usize,
    /// Number of hull vertices
    pub hull_size: usize,
    /// Tour length after construction
    pub initial_cost: f64,
    /// Tour length after 2-opt
    pub cost: f64,
    /// Improvement of 2-opt over the constructed tour, in percent
    pub improvement: f64,
    /// Number of applied 2-opt swaps
    pub swaps: usize,
    /// Computation time in seconds
    pub time: f64,
}

/// Aggregated statistics for one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub instance: String,
    pub dimension: usize,
    pub runs: usize,
    pub hull_size: usize,
    pub best_cost: f64,
    pub avg_cost: f64,
    pub avg_improvement: f64,
    pub avg_time: f64,
    pub std_time: f64,
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of runs per instance
    pub num_runs: usize,
    /// Pass cap handed to 2-opt
    pub max_passes: Option<usize>,
    /// Run instances in parallel
    pub parallel: bool,
    /// Show a progress bar
    pub progress: bool,
    /// Directory receiving `results.csv`, `statistics.csv` and `report.txt`
    pub output_dir: PathBuf,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            max_passes: None,
            parallel: true,
            progress: true,
            output_dir: PathBuf::from("results"),
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    /// Run the pipeline `num_runs` times on one instance
    pub fn run_instance(&self, instance: &TspInstance) -> Vec<RunResult> {
        let solver = ChnnSolver::with_max_passes(self.config.max_passes);

        (0..self.config.num_runs)
            .map(|run| {
                let solution = solver.solve(instance);
                RunResult {
                    instance: instance.name.clone(),
                    dimension: instance.dimension(),
                    run,
                    hull_size: solution.hull.len(),
                    initial_cost: solution.initial_cost,
                    cost: solution.cost,
                    improvement: solution.improvement_percent(),
                    swaps: solution.iterations.unwrap_or(0),
                    time: solution.computation_time,
                }
            })
            .collect()
    }

    /// Run benchmark on multiple instances
    pub fn run_on_instances(&mut self, instances: &[TspInstance]) {
        let bar = if self.config.progress {
            let bar = ProgressBar::new(instances.len() as u64);
            if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let run = |instance: &TspInstance| {
            log::info!("Running benchmark on instance: {}", instance.name);
            let results = self.run_instance(instance);
            bar.set_message(instance.name.clone());
            bar.inc(1);
            results
        };

        let batches: Vec<Vec<RunResult>> = if self.config.parallel {
            instances.par_iter().map(run).collect()
        } else {
            instances.iter().map(run).collect()
        };
        bar.finish_and_clear();

        self.results.extend(batches.into_iter().flatten());
    }

    /// Compute statistics for each instance, ordered by dimension
    pub fn compute_statistics(&self) -> Vec<InstanceSummary> {
        let mut by_instance: BTreeMap<String, Vec<&RunResult>> = BTreeMap::new();
        for result in &self.results {
            by_instance.entry(result.instance.clone())
                .or_default()
                .push(result);
        }

        let mut statistics: Vec<InstanceSummary> = by_instance
            .into_iter()
            .map(|(instance, runs)| {
                let costs: Vec<f64> = runs.iter().map(|r| r.cost).collect();
                let times: Vec<f64> = runs.iter().map(|r| r.time).collect();
                let improvements: Vec<f64> = runs.iter().map(|r| r.improvement).collect();

                let std_time = if times.len() > 1 { times.iter().std_dev() } else { 0.0 };

                InstanceSummary {
                    instance,
                    dimension: runs[0].dimension,
                    runs: runs.len(),
                    hull_size: runs[0].hull_size,
                    best_cost: costs.iter().cloned().fold(f64::INFINITY, f64::min),
                    avg_cost: costs.iter().mean(),
                    avg_improvement: improvements.iter().mean(),
                    avg_time: times.iter().mean(),
                    std_time,
                    total_time: times.iter().sum(),
                }
            })
            .collect();

        statistics.sort_by_key(|s| s.dimension);
        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("     CH-NN + 2-Opt Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!("Generated: {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        report.push_str(&format!("Runs per instance: {}\n", self.config.num_runs));
        match self.config.max_passes {
            Some(cap) => report.push_str(&format!("2-opt pass cap: {}\n\n", cap)),
            None => report.push_str("2-opt pass cap: none\n\n"),
        }

        report.push_str("-".repeat(88).as_str());
        report.push('\n');
        report.push_str(&format!("{:<25} {:>7} {:>6} {:>14} {:>10} {:>10} {:>10}\n",
            "Instance", "n", "Hull", "Best Cost", "Impr%", "Avg Time", "Std Time"));
        report.push_str("-".repeat(88).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!("{:<25} {:>7} {:>6} {:>14.2} {:>10.2} {:>10.4} {:>10.4}\n",
                stat.instance,
                stat.dimension,
                stat.hull_size,
                stat.best_cost,
                stat.avg_improvement,
                stat.avg_time,
                stat.std_time));
        }

        report.push_str("-".repeat(88).as_str());
        report.push('\n');

        report
    }

    /// Write raw results, per-instance statistics and the report into
    /// `output_dir`, creating it if needed. Returns the written paths.
    pub fn export_all(&self) -> std::io::Result<Vec<PathBuf>> {
        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir)?;

        let results_path = dir.join("results.csv");
        self.export_to_csv(&results_path)?;

        let stats_path = dir.join("statistics.csv");
        self.export_statistics_csv(&stats_path)?;

        let report_path = dir.join("report.txt");
        std::fs::write(&report_path, self.generate_report())?;

        log::info!("Benchmark output written to {:?}", dir);
        Ok(vec![results_path, stats_path, report_path])
    }

    /// Get all results
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }
}

/// Load every readable instance file (`.tsp`, `.txt`, `.pts`) in a directory,
/// sorted by dimension
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> Vec<TspInstance> {
    let mut instances = Vec::new();

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let known = path
                .extension()
                .map(|e| e == "tsp" || e == "txt" || e == "pts")
                .unwrap_or(false);
            if !known {
                continue;
            }
            match TspInstance::from_file(&path) {
                Ok(instance) => instances.push(instance),
                Err(e) => log::warn!("Skipping {:?}: {}", path, e),
            }
        }
    }

    instances.sort_by_key(|i| i.dimension());

    instances
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config(num_runs: usize) -> BenchmarkConfig {
        BenchmarkConfig {
            num_runs,
            progress: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 5);
        assert!(config.max_passes.is_none());
    }

    #[test]
    fn test_runs_are_recorded_per_instance() {
        let instances = vec![TspInstance::random(30, 1, 100.0), TspInstance::random(10, 2, 100.0)];
        let mut benchmark = Benchmark::new(quiet_config(3));
        benchmark.run_on_instances(&instances);

        assert_eq!(benchmark.results().len(), 6);

        let stats = benchmark.compute_statistics();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].dimension, 10);
        assert_eq!(stats[1].runs, 3);
        // the pipeline is deterministic
        assert!((stats[1].best_cost - stats[1].avg_cost).abs() < 1e-9);
        assert!(stats.iter().all(|s| s.avg_improvement >= 0.0));
    }

    #[test]
    fn test_single_run_has_zero_spread() {
        let mut benchmark = Benchmark::new(BenchmarkConfig { parallel: false, ..quiet_config(1) });
        benchmark.run_on_instances(&[TspInstance::random(15, 9, 10.0)]);
        let stats = benchmark.compute_statistics();
        assert_eq!(stats[0].std_time, 0.0);
        assert!(benchmark.generate_report().contains("random15-s9"));
    }

    #[test]
    fn test_export_all_writes_into_output_dir() {
        let dir = std::env::temp_dir().join(format!("chnn-bench-{}", std::process::id()));
        let mut benchmark = Benchmark::new(BenchmarkConfig {
            output_dir: dir.clone(),
            ..quiet_config(2)
        });
        benchmark.run_on_instances(&[TspInstance::random(12, 4, 50.0)]);

        let written = benchmark.export_all().unwrap();
        assert_eq!(written.len(), 3);
        assert!(written.iter().all(|p| p.starts_with(&dir) && p.exists()));

        let results = std::fs::read_to_string(dir.join("results.csv")).unwrap();
        // header plus one row per run
        assert_eq!(results.lines().count(), 3);
        let report = std::fs::read_to_string(dir.join("report.txt")).unwrap();
        assert!(report.contains("random12-s4"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
