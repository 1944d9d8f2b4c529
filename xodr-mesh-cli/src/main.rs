use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use tracing::{info, warn};
use xodr_mesh::{build_network_mesh, parse_xodr_file, ObjWriter, TessellationConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Converts an OpenDRIVE road network into an OBJ mesh", long_about = None)]
struct Args {
    /// Input OpenDRIVE (.xodr) file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output OBJ file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Maximum chord error between the mesh and the road surface
    #[arg(long, default_value_t = TessellationConfig::DEFAULT_MAX_CHORD_ERROR)]
    precision: f64,

    /// Smallest station step
    #[arg(long)]
    min_step: Option<f64>,

    /// Largest station step
    #[arg(long)]
    max_step: Option<f64>,

    /// Allowed gap between consecutive geometries
    #[arg(long)]
    tolerance: Option<f64>,

    /// Worker threads (default: number of CPU cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Skip road-mark strips
    #[arg(long)]
    no_road_marks: bool,

    /// Mesh driving lanes only
    #[arg(long)]
    driving_only: bool,

    /// Ignore elevation, superelevation and lateral shape
    #[arg(long)]
    flatten: bool,
}

impl Args {
    fn tessellation_config(&self) -> TessellationConfig {
        let defaults = TessellationConfig::default();
        TessellationConfig {
            max_chord_error: self.precision,
            min_step: self.min_step.unwrap_or(defaults.min_step),
            max_step: self.max_step.unwrap_or(defaults.max_step),
            continuity_tolerance: self.tolerance.unwrap_or(defaults.continuity_tolerance),
            road_marks: !self.no_road_marks,
            driving_only: self.driving_only,
            flatten_profiles: self.flatten,
        }
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments; usage errors exit with 1, --help and --version with 0
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };

    // Initialize logging (stderr, stdout carries progress lines)
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Record start time
    let start_time = std::time::Instant::now();

    // Configure the thread pool
    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    let config = args.tessellation_config();
    config.validate()?;

    // Load the road network
    let network = parse_xodr_file(&args.input)
        .with_context(|| format!("Failed to parse XODR file: {}", args.input.display()))?;
    if network.roads.is_empty() {
        bail!("No roads found in XODR file: {}", args.input.display());
    }
    println!("Successfully loaded XODR file: {}", args.input.display());

    // Tessellate every road
    let output = build_network_mesh(&network, &config)?;
    if !output.skipped.is_empty() {
        warn!(
            "{} of {} roads were skipped",
            output.skipped.len(),
            network.roads.len()
        );
    }
    match output.mesh.bounds() {
        Some((min, max)) => info!(
            "Mesh bounds: ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        ),
        None => warn!("No road produced any geometry, writing an empty mesh"),
    }

    // Write the OBJ file
    ObjWriter::new().write(&output.mesh, &args.output)?;
    println!("OBJ file successfully written to: {}", args.output.display());

    info!("Finished in {:.2?}", start_time.elapsed());
    Ok(())
}
