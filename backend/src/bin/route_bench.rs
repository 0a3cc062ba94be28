use std::{fs::File, io::BufWriter, path::PathBuf};

use clap::Parser;
use geo_route_sim::{
    models::BoundingBox,
    perf::{
        BenchmarkReport, MemoryProbe, performance_table, run_performance, run_scalability,
        scalability_table,
    },
};
use rand::{SeedableRng, rngs::SmallRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

/// Reads dhat's running total of allocated bytes.
struct DhatProbe;

impl MemoryProbe for DhatProbe {
    fn allocated_bytes(&self) -> u64 {
        dhat::HeapStats::get().total_bytes
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Measure execution time and allocations of the route scoring simulator"
)]
struct Args {
    /// Number of single-route performance tests
    #[arg(long, default_value_t = 10)]
    tests: usize,

    /// Largest node count for the scalability sweep
    #[arg(long, default_value_t = 15)]
    max_nodes: usize,

    /// Seed for reproducible runs; omitted means a fresh OS seed
    #[arg(long)]
    seed: Option<u64>,

    /// Also write both result sets as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Testing mode keeps the stats queryable without writing dhat-heap.json.
    let _profiler = dhat::Profiler::builder().testing().build();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    let area = BoundingBox::BENCHMARK_AREA;

    tracing::info!("running {} performance tests", args.tests);
    let performance = run_performance(args.tests, area, &DhatProbe, &mut rng);

    tracing::info!("running scalability sweep up to {} nodes", args.max_nodes);
    let scalability = run_scalability(args.max_nodes, area, &DhatProbe, &mut rng);

    println!("Performance");
    println!("{}", performance_table(&performance));
    println!();
    println!("Scalability");
    println!("{}", scalability_table(&scalability));

    if let Some(path) = &args.output {
        let report = BenchmarkReport {
            performance,
            scalability,
        };
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &report)?;
        tracing::info!("report written to {:?}", path);
    }

    Ok(())
}
