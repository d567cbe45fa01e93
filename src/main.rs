//! SegmentForge: customer segmentation analytics over arbitrary CSV data.
//!
//! This is the driver binary: it loads a CSV upload (or generates sample
//! data), runs one full analysis pass, and prints the resulting metrics and
//! segment assignments as text or JSON.

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use segmentforge::cli::{DataSource, OutputFormat};
use segmentforge::{analyze, generate_sample, AnalysisOptions, AnalysisReport, Args, Dataset};
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.verbose {
        println!("SegmentForge - Customer Segmentation Analytics");
        println!("==============================================\n");
    }

    let start_time = Instant::now();

    // Step 1: Load or generate the dataset
    let dataset = match args.source()? {
        DataSource::Csv(path) => {
            if args.verbose {
                println!("Step 1: Loading data from: {path}");
            }
            Dataset::from_path(&path)?
        }
        DataSource::Sample(count) => {
            if args.verbose {
                println!("Step 1: Generating {count} sample customers");
            }
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            generate_sample(count, &mut rng)
        }
    };
    let load_time = start_time.elapsed();

    if args.verbose {
        println!("✓ Dataset ready: {} rows, {} columns", dataset.len(), dataset.columns().len());
        println!("  Load time: {:.2}s\n", load_time.as_secs_f64());
    }

    // Step 2: Run the analysis pipeline
    let options = AnalysisOptions {
        seed: args.seed,
        max_iterations: args.max_iters,
    };
    let analysis_start = Instant::now();
    let report = analyze(&dataset, &options)?;
    let analysis_time = analysis_start.elapsed();

    if args.verbose {
        println!("✓ Analysis complete in {:.2}s", analysis_time.as_secs_f64());
    }

    // Step 3: Emit the report
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report, args.verbose),
    }

    if args.verbose {
        println!("\nTotal processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    }

    Ok(())
}

/// Print the sectioned text summary.
fn print_report(report: &AnalysisReport, verbose: bool) {
    let metrics = &report.metrics;

    println!("=== Summary ===");
    println!("Total customers:  {}", metrics.total_customers);
    println!("Total revenue:    {:.2}", metrics.total_revenue);
    println!("Avg per customer: {:.2}", metrics.avg_revenue_per_customer);
    println!("Top segment:      {}", metrics.top_segment);

    println!("\n=== Segment Distribution ===");
    for segment in &metrics.segment_distribution {
        println!(
            "  {:<18} {:>6} customers ({:>3}%)",
            segment.name, segment.member_count, segment.percentage
        );
    }

    println!("\n=== Monthly Trend ===");
    if metrics.monthly_trend.estimated {
        println!("  (no parseable dates found; showing estimated distribution)");
    }
    for bucket in &metrics.monthly_trend.buckets {
        println!(
            "  {}  {:>6} customers  revenue {:>12.2}",
            bucket.month, bucket.customer_count, bucket.revenue
        );
    }

    if verbose {
        println!("\n=== Detected Fields ===");
        println!("  Identifier: {}", report.roles.identifier);
        println!("  Monetary:   {:?}", report.roles.monetary);
        println!("  Temporal:   {:?}", report.roles.temporal);
        println!("  Numeric:    {:?}", report.roles.numeric);

        println!("\n=== Clusters ===");
        println!("  Cluster | Size | Segment");
        println!("  --------|------|----------------");
        for cluster in &report.clusters {
            println!(
                "  {:7} | {:4} | {}",
                cluster.id, cluster.size, cluster.name
            );
        }
    }
}
