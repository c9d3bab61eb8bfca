use lazy_static::lazy_static;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;
use tracing_subscriber::{EnvFilter, prelude::*};
use tracing_timing::{Builder, Histogram};
use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use std::time::{Duration, Instant};
use std::cell::RefCell;

const HISTOGRAM_MAX_NS: u64 = 60_000_000_000;
const HISTOGRAM_SIGFIG: u8 = 3;

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum OperationCategory {
    GraphBuild,
    Calculation {
        subcategory: CalculationType,
    },
    FileIO {
        subcategory: FileIOType,
    },
    Other,
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum CalculationType {
    Centroid,
    WeightedCentroid,
    PMedian,
    SpanningTree,
    NearestNode,
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum FileIOType {
    PolygonLoad,
    ConfigLoad,
    ResultsExport,
}

impl OperationCategory {
    pub fn as_str(&self) -> String {
        match self {
            OperationCategory::GraphBuild => "Graph Build".to_string(),
            OperationCategory::Calculation { subcategory } => {
                format!("Calculation - {}", match subcategory {
                    CalculationType::Centroid => "Centroid",
                    CalculationType::WeightedCentroid => "Weighted Centroid",
                    CalculationType::PMedian => "p-Median",
                    CalculationType::SpanningTree => "Spanning Tree",
                    CalculationType::NearestNode => "Nearest Node",
                })
            },
            OperationCategory::FileIO { subcategory } => {
                format!("File I/O - {}", match subcategory {
                    FileIOType::PolygonLoad => "Polygon Load",
                    FileIOType::ConfigLoad => "Config Load",
                    FileIOType::ResultsExport => "Results Export",
                })
            },
            OperationCategory::Other => "Other Operations".to_string(),
        }
    }
}

thread_local! {
    static TIMING_STACK: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

lazy_static! {
    static ref TIMING_ENABLED: AtomicBool = AtomicBool::new(false);
    static ref FUNCTION_TIMINGS: Arc<RwLock<HashMap<String, Histogram<u64>>>> = Arc::new(RwLock::new(HashMap::new()));
    static ref CATEGORY_TIMINGS: Arc<RwLock<HashMap<OperationCategory, Histogram<u64>>>> = Arc::new(RwLock::new(HashMap::new()));
    static ref HIERARCHICAL_TIMINGS: Arc<RwLock<HashMap<String, (Duration, usize, Vec<String>)>>> = Arc::new(RwLock::new(HashMap::new()));
}

/// Records the elapsed time of the enclosing scope when dropped.
pub struct TimingGuard {
    function_name: String,
    category: OperationCategory,
    start: Instant,
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        record_timing_end(&self.function_name, duration, &self.category);
    }
}

pub fn start_timing(function_name: &str, category: OperationCategory) -> TimingGuard {
    TIMING_STACK.with(|stack| {
        stack.borrow_mut().push(function_name.to_string());
    });

    TimingGuard {
        function_name: function_name.to_string(),
        category,
        start: Instant::now(),
    }
}

fn new_histogram() -> Option<Histogram<u64>> {
    Histogram::<u64>::new_with_bounds(1, HISTOGRAM_MAX_NS, HISTOGRAM_SIGFIG).ok()
}

fn record_timing_end(function_name: &str, duration: Duration, category: &OperationCategory) {
    // The stack is kept balanced even when timing is off
    let parent = TIMING_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.pop();
        stack.last().cloned()
    });

    if !is_timing_enabled() {
        return;
    }

    {
        let mut hierarchical = HIERARCHICAL_TIMINGS.write();
        let entry = hierarchical
            .entry(function_name.to_string())
            .or_insert((Duration::from_nanos(0), 0, Vec::new()));
        entry.0 += duration;
        entry.1 += 1;
        if let Some(parent_name) = parent {
            if !entry.2.contains(&parent_name) {
                entry.2.push(parent_name);
            }
        }
    }

    let duration_ns = (duration.as_nanos() as u64).clamp(1, HISTOGRAM_MAX_NS);

    {
        let mut timings = FUNCTION_TIMINGS.write();
        if !timings.contains_key(function_name) {
            if let Some(histogram) = new_histogram() {
                timings.insert(function_name.to_string(), histogram);
            }
        }
        if let Some(histogram) = timings.get_mut(function_name) {
            let _ = histogram.record(duration_ns);
        }
    }

    {
        let mut category_timings = CATEGORY_TIMINGS.write();
        if !category_timings.contains_key(category) {
            if let Some(histogram) = new_histogram() {
                category_timings.insert(category.clone(), histogram);
            }
        }
        if let Some(histogram) = category_timings.get_mut(category) {
            let _ = histogram.record(duration_ns);
        }
    }
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// keep the first subscriber.
pub fn init_logging(enable_timing: bool, debug_logging: bool) {
    TIMING_ENABLED.store(enable_timing, Ordering::SeqCst);

    let crate_level = if debug_logging { "depot_locator=debug" } else { "depot_locator=info" };
    let mut env_filter = EnvFilter::from_default_env().add_directive(Level::WARN.into());
    if let Ok(directive) = crate_level.parse() {
        env_filter = env_filter.add_directive(directive);
    }

    let result = if enable_timing {
        let histogram = || {
            Histogram::<u64>::new_with_bounds(1, HISTOGRAM_MAX_NS, HISTOGRAM_SIGFIG).unwrap()
        };
        let timing_layer = Builder::default().layer(histogram);

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .with(timing_layer.boxed());
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(false));
        tracing::subscriber::set_global_default(subscriber)
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed, keeping it");
    }
}

pub fn is_timing_enabled() -> bool {
    TIMING_ENABLED.load(Ordering::SeqCst)
}

pub fn print_timing_report() {
    if !is_timing_enabled() {
        return;
    }

    println!("\nPerformance Report");
    println!("==================");

    println!("\nBy Function:");
    println!("------------");
    let hierarchical = HIERARCHICAL_TIMINGS.read();
    let mut entries: Vec<_> = hierarchical.iter().collect();
    entries.sort_by(|a, b| b.1.0.cmp(&a.1.0));

    for (function_name, (total_duration, count, parents)) in entries {
        let avg_duration = total_duration.div_f64(*count as f64);
        println!(
            "{}: total={:.3}ms, count={}, avg={:.3}ms{}",
            function_name,
            total_duration.as_secs_f64() * 1000.0,
            count,
            avg_duration.as_secs_f64() * 1000.0,
            if !parents.is_empty() {
                format!("\n  Called by: {}", parents.join(", "))
            } else {
                String::new()
            }
        );
    }

    println!("\nBy Category:");
    println!("------------");
    let category_timings = CATEGORY_TIMINGS.read();
    let mut category_vec: Vec<_> = category_timings.iter().collect();
    category_vec.sort_by(|a, b| {
        b.1.mean().partial_cmp(&a.1.mean()).unwrap_or(std::cmp::Ordering::Equal)
    });

    for (category, histogram) in category_vec {
        println!(
            "{}: mean={:.3}ms, p95={:.3}ms, count={}",
            category.as_str(),
            histogram.mean() / 1_000_000.0,
            histogram.value_at_quantile(0.95) as f64 / 1_000_000.0,
            histogram.len(),
        );
    }

    println!("==================\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels() {
        let category = OperationCategory::Calculation { subcategory: CalculationType::PMedian };
        assert_eq!(category.as_str(), "Calculation - p-Median");
        assert_eq!(OperationCategory::GraphBuild.as_str(), "Graph Build");
    }

    #[test]
    fn guards_nest_without_timing_enabled() {
        let outer = start_timing("outer", OperationCategory::Other);
        {
            let _inner = start_timing("inner", OperationCategory::Other);
        }
        drop(outer);
        TIMING_STACK.with(|stack| assert!(stack.borrow().is_empty()));
    }
}
