//! Timing and allocation harness for the route simulator.

use std::time::{Duration, Instant};

use comfy_table::Table;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{BoundingBox, Coordinate, Priority};
use crate::routing::calculate_route;
use crate::scoring::quality_score;

/// Source of the process' cumulative allocated byte count.
///
/// Only differences between two readings are used, so the counter just has
/// to be monotonic.
pub trait MemoryProbe {
    fn allocated_bytes(&self) -> u64;
}

/// Probe for builds without an instrumented allocator; reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProbe;

impl MemoryProbe for NoopProbe {
    fn allocated_bytes(&self) -> u64 {
        0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub test_num: usize,
    pub execution_time_secs: f64,
    pub memory_bytes: u64,
    pub quality_score: f64,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalabilitySample {
    pub num_nodes: usize,
    pub execution_time_secs: f64,
    pub memory_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub performance: Vec<PerformanceSample>,
    pub scalability: Vec<ScalabilitySample>,
}

struct Measured<T> {
    value: T,
    elapsed: Duration,
    allocated: u64,
}

fn measure<T, P>(probe: &P, f: impl FnOnce() -> T) -> Measured<T>
where
    P: MemoryProbe + ?Sized,
{
    let before = probe.allocated_bytes();
    let start = Instant::now();
    let value = f();
    let elapsed = start.elapsed();
    let allocated = probe.allocated_bytes().saturating_sub(before);
    Measured {
        value,
        elapsed,
        allocated,
    }
}

/// Runs `num_tests` simulations between random points of `area`, each with a
/// random priority, and scores the route each one picks.
pub fn run_performance<P, R>(
    num_tests: usize,
    area: BoundingBox,
    probe: &P,
    rng: &mut R,
) -> Vec<PerformanceSample>
where
    P: MemoryProbe + ?Sized,
    R: Rng + ?Sized,
{
    (1..=num_tests)
        .map(|test_num| {
            let priority = Priority::ALL[rng.random_range(0..Priority::ALL.len())];
            let origin = area.random_point(rng);
            let destination = area.random_point(rng);

            let run = measure(probe, || calculate_route(origin, destination, priority, rng));
            let quality_score = quality_score(run.value.chosen_route(), priority);

            tracing::debug!(
                "test {test_num}: priority={priority} time={:?} allocated={}B score={quality_score:.3}",
                run.elapsed,
                run.allocated
            );

            PerformanceSample {
                test_num,
                execution_time_secs: run.elapsed.as_secs_f64(),
                memory_bytes: run.allocated,
                quality_score,
                priority,
            }
        })
        .collect()
}

/// For 1..=`max_nodes` random locations, times routing every consecutive
/// pair and measures the allocations of a single first-to-last route.
pub fn run_scalability<P, R>(
    max_nodes: usize,
    area: BoundingBox,
    probe: &P,
    rng: &mut R,
) -> Vec<ScalabilitySample>
where
    P: MemoryProbe + ?Sized,
    R: Rng + ?Sized,
{
    let mut samples = Vec::with_capacity(max_nodes);

    for num_nodes in 1..=max_nodes {
        let locations: Vec<Coordinate> = (0..num_nodes).map(|_| area.random_point(rng)).collect();

        let chain = measure(probe, || {
            for pair in locations.windows(2) {
                calculate_route(pair[0], pair[1], Priority::Medium, rng);
            }
        });

        let first = locations[0];
        let last = locations[num_nodes - 1];
        let single = measure(probe, || calculate_route(first, last, Priority::Medium, rng));

        tracing::debug!(
            "{num_nodes} nodes: chain time={:?} single route allocated={}B",
            chain.elapsed,
            single.allocated
        );

        samples.push(ScalabilitySample {
            num_nodes,
            execution_time_secs: chain.elapsed.as_secs_f64(),
            memory_bytes: single.allocated,
        });
    }

    samples
}

fn kib(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0)
}

pub fn performance_table(samples: &[PerformanceSample]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Test", "Time (s)", "Memory (KiB)", "Quality", "Priority"]);
    for sample in samples {
        table.add_row(vec![
            sample.test_num.to_string(),
            format!("{:.6}", sample.execution_time_secs),
            kib(sample.memory_bytes),
            format!("{:.2}", sample.quality_score),
            sample.priority.to_string(),
        ]);
    }
    table
}

pub fn scalability_table(samples: &[ScalabilitySample]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Nodes", "Time (s)", "Memory (KiB)"]);
    for sample in samples {
        table.add_row(vec![
            sample.num_nodes.to_string(),
            format!("{:.6}", sample.execution_time_secs),
            kib(sample.memory_bytes),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    /// Pretends every reading follows another 128 bytes of allocations.
    struct SteppingProbe {
        total: Cell<u64>,
    }

    impl MemoryProbe for SteppingProbe {
        fn allocated_bytes(&self) -> u64 {
            let next = self.total.get() + 128;
            self.total.set(next);
            next
        }
    }

    #[test]
    fn test_performance_sample_count_and_scores() {
        let mut rng = SmallRng::seed_from_u64(3);
        let samples = run_performance(6, BoundingBox::BENCHMARK_AREA, &NoopProbe, &mut rng);

        assert_eq!(samples.len(), 6);
        for (idx, sample) in samples.iter().enumerate() {
            assert_eq!(sample.test_num, idx + 1);
            assert_eq!(sample.memory_bytes, 0);
            assert!(sample.execution_time_secs >= 0.0);
            // Points within ~15 km keep both components well inside their caps.
            assert!(sample.quality_score > 0.0 && sample.quality_score <= 1.0);
        }
    }

    #[test]
    fn test_performance_matches_direct_scoring() {
        let area = BoundingBox::BENCHMARK_AREA;
        let samples = run_performance(1, area, &NoopProbe, &mut SmallRng::seed_from_u64(11));

        // Replay the same draws by hand.
        let mut rng = SmallRng::seed_from_u64(11);
        let priority = Priority::ALL[rng.random_range(0..Priority::ALL.len())];
        let origin = area.random_point(&mut rng);
        let destination = area.random_point(&mut rng);
        let bundle = calculate_route(origin, destination, priority, &mut rng);

        assert_eq!(samples[0].priority, priority);
        assert_eq!(
            samples[0].quality_score,
            quality_score(bundle.chosen_route(), priority)
        );
    }

    #[test]
    fn test_probe_deltas_are_recorded() {
        let probe = SteppingProbe { total: Cell::new(0) };
        let mut rng = SmallRng::seed_from_u64(5);

        let perf = run_performance(3, BoundingBox::BENCHMARK_AREA, &probe, &mut rng);
        assert!(perf.iter().all(|s| s.memory_bytes == 128));

        let scale = run_scalability(4, BoundingBox::BENCHMARK_AREA, &probe, &mut rng);
        assert!(scale.iter().all(|s| s.memory_bytes == 128));
    }

    #[test]
    fn test_scalability_node_counts() {
        let mut rng = SmallRng::seed_from_u64(9);
        let samples = run_scalability(5, BoundingBox::BENCHMARK_AREA, &NoopProbe, &mut rng);

        let nodes: Vec<usize> = samples.iter().map(|s| s.num_nodes).collect();
        assert_eq!(nodes, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_zero_runs_are_empty() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(run_performance(0, BoundingBox::BENCHMARK_AREA, &NoopProbe, &mut rng).is_empty());
        assert!(run_scalability(0, BoundingBox::BENCHMARK_AREA, &NoopProbe, &mut rng).is_empty());
    }

    #[test]
    fn test_tables_render_rows() {
        let perf = vec![PerformanceSample {
            test_num: 1,
            execution_time_secs: 0.000125,
            memory_bytes: 2048,
            quality_score: 0.8123,
            priority: Priority::High,
        }];
        let rendered = performance_table(&perf).to_string();
        assert!(rendered.contains("0.000125"));
        assert!(rendered.contains("2.00"));
        assert!(rendered.contains("0.81"));
        assert!(rendered.contains("high"));

        let scale = vec![ScalabilitySample {
            num_nodes: 7,
            execution_time_secs: 0.5,
            memory_bytes: 512,
        }];
        let rendered = scalability_table(&scale).to_string();
        assert!(rendered.contains("0.500000"));
        assert!(rendered.contains("0.50"));
    }
}
