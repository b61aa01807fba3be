//! Command line front end.
//!
//! Loads regions, parent regions and a location-history export, counts
//! points per region, prints a summary and optionally exports the results.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use footprint::config::Config;
use footprint::loader::{
    load_parents, load_points, load_regions, write_counts_csv, write_points_geojson,
    write_regions_geojson,
};
use footprint::models::{MatchResult, ParentTable, Point};
use footprint::pip::{AggregateReport, MatchEngine, PipService, RegionCounts, RegionIndex};

#[derive(Parser, Debug)]
#[command(name = "footprint")]
#[command(about = "Count location-history points per region and list the parent regions covered")]
struct Args {
    /// JSON file with points (timeline export or array of points)
    #[arg(short, long, alias = "json-file")]
    points: PathBuf,

    /// GeoJSON FeatureCollection of regions (e.g. counties)
    #[arg(long)]
    regions: Option<PathBuf>,

    /// GeoJSON FeatureCollection of parent regions (e.g. states)
    #[arg(long)]
    parents: Option<PathBuf>,

    /// TOML config describing data files and property names
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Export matched regions as GeoJSON
    #[arg(long)]
    export_geojson: Option<PathBuf>,

    /// Export normalized points as GeoJSON
    #[arg(long)]
    export_points: Option<PathBuf>,

    /// Export per-region counts as CSV
    #[arg(long)]
    export_counts: Option<PathBuf>,

    /// Match on all cores instead of batch by batch
    #[arg(long)]
    parallel: bool,

    /// Points per progress step in sequential mode
    #[arg(long, default_value = "10000")]
    batch_size: usize,

    /// Parent names shown in the summary before truncating
    #[arg(long, default_value = "5")]
    summary_names: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides --verbose
    let default_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    let regions_path = args
        .regions
        .clone()
        .or(config.data.regions.clone())
        .context("No regions file given (use --regions or [data].regions in the config)")?;

    let regions = load_regions(&regions_path, &config.regions)
        .with_context(|| format!("Failed to load regions from {}", regions_path.display()))?;
    let index = RegionIndex::build(regions).context("Failed to build region index")?;

    let parents = match args.parents.clone().or(config.data.parents.clone()) {
        Some(path) => load_parents(&path, &config.parents)
            .with_context(|| format!("Failed to load parent regions from {}", path.display()))?,
        None => {
            warn!("No parent regions file given; parent roll-up will be empty");
            ParentTable::new()
        }
    };

    let batch = load_points(&args.points)
        .with_context(|| format!("Failed to load points from {}", args.points.display()))?;
    let rejected = batch.rejected_total();

    let service = PipService::new(index, parents).parallel(args.parallel);

    info!("Finding regions that match {} points", batch.points.len());
    let result = if args.parallel {
        service.match_points(&batch.points, rejected)
    } else {
        match_with_progress(&service, &batch.points, args.batch_size, rejected)?
    };

    export(&args, &service, &result, &batch.points)?;

    let report = AggregateReport::from_result(&result);
    print_summary(&report, args.summary_names);

    Ok(())
}

/// Match sequentially in batches, reusing one count table and advancing a
/// progress bar after each batch.
fn match_with_progress(
    service: &PipService,
    points: &[Point],
    batch_size: usize,
    rejected: u64,
) -> Result<MatchResult> {
    let pb = ProgressBar::new(points.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let engine = MatchEngine::new(service.index());
    let mut counts = RegionCounts::for_index(service.index());
    for chunk in points.chunks(batch_size.max(1)) {
        engine.count_into(&mut counts, chunk);
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();

    Ok(service.finish(&counts, rejected))
}

fn export(args: &Args, service: &PipService, result: &MatchResult, points: &[Point]) -> Result<()> {
    if let Some(path) = &args.export_geojson {
        if result.matched_regions.is_empty() {
            warn!("No matched regions; skipping GeoJSON export");
        } else {
            write_regions_geojson(path, service.index(), result)
                .context("Failed to export matched regions")?;
        }
    }
    if let Some(path) = &args.export_points {
        write_points_geojson(path, points).context("Failed to export points")?;
    }
    if let Some(path) = &args.export_counts {
        write_counts_csv(path, result).context("Failed to export region counts")?;
    }
    Ok(())
}

fn print_summary(report: &AggregateReport, names: usize) {
    println!("\nProcessing Summary:");
    println!("- Total points processed: {}", report.total_points);
    if report.rejected_points > 0 {
        println!("- Points rejected: {}", report.rejected_points);
    }
    println!("- Regions matched: {}", report.regions_matched);
    println!("- Matched points (per region): {}", report.total_matched_points);
    println!("- Parent regions covered: {}", report.parents_covered);
    println!("- Parent regions: {}", report.parent_names_display(names));
}
