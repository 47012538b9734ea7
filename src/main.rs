use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dishwatch::{AnalysisResults, App, Category, FileSource, PollSummary, Settings, Timeline};

#[derive(Parser, Debug)]
#[command(name = "dishwatch")]
#[command(about = "Outage analysis for satellite terminal history dumps")]
struct Args {
    /// History dumps (JSON files, or directories of them) in capture order
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Config file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ping loss ratio at or above which a second counts as an outage (0-1)
    #[arg(long)]
    min_loss_ratio: Option<f64>,

    /// Downlink throughput (bps) at or above which loss is overruled
    #[arg(long)]
    min_down_bps: Option<f64>,

    /// Uplink throughput (bps) at or above which loss is overruled
    #[arg(long)]
    min_up_bps: Option<f64>,

    /// SNR at or below which a second counts as low signal (0-9)
    #[arg(long)]
    max_snr: Option<f64>,

    /// Shortest connected span to report, in seconds
    #[arg(long)]
    connected_min_sec: Option<u64>,

    /// Longest outage, in seconds, that does not break a connected span
    #[arg(long)]
    connected_max_dsec: Option<u64>,

    /// Leave a category out of the accounting (repeatable)
    #[arg(short, long = "disable", value_name = "CATEGORY")]
    disabled: Vec<Category>,

    /// Export the analysis results to a JSON file
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dishwatch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load(args.config.as_deref())?;
    let mut app = App::new(settings.thresholds());
    apply_overrides(&mut app, &args);

    let mut source = FileSource::new(&args.paths);
    let summary = app.drain(&mut source);
    if summary.accepted == 0 {
        anyhow::bail!("No usable snapshots in {}", source_list(&args.paths));
    }

    let results = app.results();
    print_ingest(&summary);
    print_results(app.timeline(), &results);

    if let Some(path) = &args.export {
        app.export_results(path)?;
        println!("\nExported results to {}", path.display());
    }

    Ok(())
}

/// Command-line flags win over the config file.
fn apply_overrides(app: &mut App, args: &Args) {
    if let Some(value) = args.min_loss_ratio {
        app.set_min_loss_ratio(value);
    }
    if let Some(value) = args.min_down_bps {
        app.set_min_down_bps(value);
    }
    if let Some(value) = args.min_up_bps {
        app.set_min_up_bps(value);
    }
    if let Some(value) = args.max_snr {
        app.set_max_snr(value);
    }
    if let Some(value) = args.connected_min_sec {
        app.set_connected_min_sec(value);
    }
    if let Some(value) = args.connected_max_dsec {
        app.set_connected_max_dsec(value);
    }
    for &category in &args.disabled {
        app.set_enabled(category, false);
    }
}

fn source_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_ingest(summary: &PollSummary) {
    println!("Snapshots: {} accepted, {} rejected", summary.accepted, summary.rejected.len());
    for (label, error) in &summary.rejected {
        println!("  rejected {}: {}", label, error);
    }
    for (label, diagnostic) in &summary.diagnostics {
        println!("  {}: {}", label, diagnostic);
    }
}

fn print_results(timeline: &Timeline, results: &AnalysisResults) {
    println!();
    match timeline.start() {
        Some(start) => println!("Timeline: {} s from {}", results.timeline_len, start),
        None => println!("Timeline: {} s (start unknown)", results.timeline_len),
    }
    println!("Low SNR:  {} s", results.low_snr_seconds);

    println!(
        "\n{:<12} {:>10} {:>8} {:>10} {:>8} {:>8} {:>8}",
        "category", "seconds", "runs", "not", "down", "up", "either"
    );
    for category in Category::ALL {
        let o = &results.overrules[category];
        println!(
            "{:<12} {:>10} {:>8} {:>10} {:>8} {:>8} {:>8}",
            category.name(),
            results.seconds[category],
            results.histogram.runs(category),
            o.not_overruled,
            o.down,
            o.up,
            o.either
        );
    }

    println!("\nAdjacent outage runs:");
    for a in Category::ALL {
        let line: Vec<String> = Category::ALL
            .iter()
            .filter(|&&b| b != a)
            .map(|&b| format!("{}={}", b.name(), results.adjacency.get(a, b)))
            .collect();
        println!("  {:<12} {}", a.name(), line.join(" "));
    }

    println!(
        "\nReclassified by adjacency: {} events",
        results.reclassification.events()
    );

    let longest = results.spans.iter().map(|s| s.len()).max().unwrap_or(0);
    println!(
        "\nConnected spans: {} ({} s total, longest {} s)",
        results.spans.len(),
        results.connected_span_seconds(),
        longest
    );
    for span in &results.spans {
        match (timeline.timestamp_of(span.start), timeline.timestamp_of(span.end)) {
            (Some(from), Some(to)) => println!("  {} .. {}  {} s", from, to, span.len()),
            _ => println!("  [{}, {})  {} s", span.start, span.end, span.len()),
        }
    }
}
