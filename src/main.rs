//! CH-NN TSP Solver - Command Line Interface
//!
//! Convex-hull seeded nearest neighbor construction refined by 2-opt.

use clap::{Parser, Subcommand};
use chnn_tsp::benchmark::{load_instances_from_dir, Benchmark, BenchmarkConfig};
use chnn_tsp::heuristics::hull::StepRecorder;
use chnn_tsp::instance::TspInstance;
use chnn_tsp::solver::ChnnSolver;
use chnn_tsp::visualization::{export_hull_steps, export_plot_data, export_tour, Visualizer};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "chnn-tsp")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Planar TSP solver: convex hull + nearest neighbor + 2-opt")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one instance
    Solve {
        /// Path to the point file
        #[arg(short, long)]
        instance: PathBuf,

        /// Cap on 2-opt passes (default: run to a local optimum)
        #[arg(long)]
        max_passes: Option<usize>,

        /// Write tour coordinates (`x y` per line) to this file
        #[arg(short, long)]
        tour: Option<PathBuf>,

        /// Directory for upper_hull_steps.txt and lower_hull_steps.txt
        #[arg(long)]
        hull_steps: Option<PathBuf>,

        /// Output solution as JSON to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generate SVG/PNG visualization next to the instance
        #[arg(long)]
        visualize: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run benchmarks on a directory of instances
    Benchmark {
        /// Directory containing instance files
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Number of runs per instance
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Cap on 2-opt passes
        #[arg(long)]
        max_passes: Option<usize>,

        /// Run instances one after another
        #[arg(long)]
        sequential: bool,

        /// Maximum instance size
        #[arg(long)]
        max_size: Option<usize>,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the point file
        #[arg(short, long)]
        instance: PathBuf,
    },

    /// Generate a random instance in tuple format
    Generate {
        /// Number of points
        #[arg(short, long, default_value = "100")]
        n: usize,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Coordinates are drawn from [0, extent)
        #[arg(long, default_value = "1000")]
        extent: f64,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Convert a TSP-LIB or plain coordinate file to tuple format
    Convert {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve { instance, max_passes, tour, hull_steps, output, visualize, verbose } => {
            solve_instance(&instance, max_passes, tour, hull_steps, output, visualize, verbose)
        }

        Commands::Benchmark { dir, output, runs, max_passes, sequential, max_size } => {
            run_benchmark(&dir, &output, runs, max_passes, !sequential, max_size)
        }

        Commands::Analyze { instance } => analyze_instance(&instance),

        Commands::Generate { n, seed, extent, output } => generate_instance(n, seed, extent, &output),

        Commands::Convert { input, output } => convert_instance(&input, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load(path: &Path) -> Result<TspInstance, String> {
    TspInstance::from_file(path).map_err(|e| format!("loading instance: {}", e))
}

fn write_file(path: &Path, contents: &str) -> Result<(), String> {
    std::fs::write(path, contents).map_err(|e| format!("writing {:?}: {}", path, e))
}

fn solve_instance(
    path: &Path,
    max_passes: Option<usize>,
    tour_path: Option<PathBuf>,
    hull_steps: Option<PathBuf>,
    output: Option<PathBuf>,
    visualize: bool,
    verbose: bool,
) -> Result<(), String> {
    println!("Loading instance from {:?}...", path);
    let instance = load(path)?;

    if verbose {
        println!("{}", instance.statistics());
    }

    let solver = ChnnSolver::with_max_passes(max_passes);
    let mut recorder = StepRecorder::new();
    let solution = solver.solve_observed(&instance, &mut recorder);

    println!("\n========== Results ==========");
    println!("Algorithm: {}", solution.algorithm);
    println!("CH-NN Tour: {}", solution.format_tour());
    println!("Hull size: {}", solution.hull.len());
    println!("Initial Tour Distance: {:.2}", solution.initial_cost);
    println!("Total Tour Distance: {:.2}", solution.cost);
    if let Some(swaps) = solution.iterations {
        println!("2-opt swaps: {}", swaps);
    }
    // whole milliseconds, truncated toward zero
    println!("Time taken by program: {} milliseconds", (solution.computation_time * 1000.0) as u64);

    if verbose {
        println!("\nImprovement: {:.2}%", solution.improvement_percent());
        println!("\n{}", export_plot_data(&instance, &solution));
    }

    if let Some(tour_path) = tour_path {
        write_file(&tour_path, &export_tour(&instance, &solution))?;
        println!("Tour saved to {:?}", tour_path);
    }

    if let Some(dir) = hull_steps {
        std::fs::create_dir_all(&dir).map_err(|e| format!("creating {:?}: {}", dir, e))?;
        write_file(
            &dir.join("upper_hull_steps.txt"),
            &export_hull_steps(&recorder.upper_points(&instance.points)),
        )?;
        write_file(
            &dir.join("lower_hull_steps.txt"),
            &export_hull_steps(&recorder.lower_points(&instance.points)),
        )?;
        println!("Hull steps saved to {:?}", dir);
    }

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&solution)
            .map_err(|e| format!("serializing solution: {}", e))?;
        write_file(&out_path, &json)?;
        println!("\nSolution saved to {:?}", out_path);
    }

    if visualize {
        let viz = Visualizer::new();
        let svg = viz.generate_svg(&instance, &solution);
        let png_path = path.with_extension("png");
        match viz.save_png(&svg, &png_path) {
            Ok(()) => println!("Visualization saved to {:?}", png_path),
            Err(e) => {
                // fallback: write SVG if PNG conversion failed
                let svg_path = path.with_extension("svg");
                viz.save_svg(&svg, &svg_path)
                    .map_err(|e| format!("writing {:?}: {}", svg_path, e))?;
                println!("PNG conversion failed ({}). Saved SVG to {:?}", e, svg_path);
            }
        }
    }

    Ok(())
}

fn run_benchmark(
    dir: &Path,
    output: &Path,
    runs: usize,
    max_passes: Option<usize>,
    parallel: bool,
    max_size: Option<usize>,
) -> Result<(), String> {
    println!("Loading instances from {:?}...", dir);

    let mut instances = load_instances_from_dir(dir);

    if let Some(max) = max_size {
        instances.retain(|i| i.dimension() <= max);
    }

    println!("Found {} instances", instances.len());

    if instances.is_empty() {
        return Err(format!("no instances found in {:?}", dir));
    }

    let config = BenchmarkConfig {
        num_runs: runs,
        max_passes,
        parallel,
        output_dir: output.to_path_buf(),
        ..Default::default()
    };

    let mut benchmark = Benchmark::new(config);
    benchmark.run_on_instances(&instances);

    println!("\n{}", benchmark.generate_report());

    let written = benchmark.export_all()
        .map_err(|e| format!("exporting results to {:?}: {}", output, e))?;
    for path in written {
        println!("Saved {:?}", path);
    }

    Ok(())
}

fn analyze_instance(path: &Path) -> Result<(), String> {
    let instance = load(path)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let solution = ChnnSolver::new().solve(&instance);

    println!("Quick Solution Estimate:");
    println!("  Hull vertices: {} of {}", solution.hull.len(), instance.dimension());
    println!("  CH-NN: {:.2}", solution.initial_cost);
    println!("  CH-NN + 2-Opt: {:.2} ({:.2}% better)", solution.cost, solution.improvement_percent());

    Ok(())
}

fn generate_instance(n: usize, seed: u64, extent: f64, output: &Path) -> Result<(), String> {
    if !(extent > 0.0) {
        return Err("extent must be positive".to_string());
    }
    let instance = TspInstance::random(n, seed, extent);
    write_file(output, &instance.to_tuple_format())?;
    println!("Wrote {} points to {:?}", n, output);
    Ok(())
}

fn convert_instance(input: &Path, output: &Path) -> Result<(), String> {
    let instance = load(input)?;
    write_file(output, &instance.to_tuple_format())?;
    println!("Converted {} points from {:?} to {:?}", instance.dimension(), input, output);
    Ok(())
}
