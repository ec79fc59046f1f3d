//! Benchmark CLI for the local simulator backends.
//!
//! Sweep mode (default) times QFT circuits from 2 qubits up to `--qubits`
//! and appends CSV rows to `--out`. Single mode (`--single`) repeatedly
//! times one width and prints summary statistics after discarding
//! warm-up samples.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing_subscriber::EnvFilter;

use skoll_bench::{BURN_IN_SAMPLES, SampleStats, SweepRecord, run_single, run_sweep};

/// Benchmark the Sköll simulator backends with QFT circuits.
#[derive(Parser)]
#[command(name = "skoll-bench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of samples to take for each width
    #[arg(long, default_value = "5")]
    samples: u32,

    /// Largest circuit width to benchmark (or the width, with --single)
    #[arg(long, default_value = "5")]
    qubits: u32,

    /// Where to append the CSV output of each sweep sample
    #[arg(long, default_value = "benchmark_data.csv")]
    out: PathBuf,

    /// Benchmark a single width and print an analysis
    #[arg(long)]
    single: bool,

    /// Skip the warm-up samples discarded before measuring
    #[arg(long)]
    no_burn: bool,

    /// Shots per qasm-simulator sample
    #[arg(long, default_value = "1024")]
    shots: u32,

    /// Fix the backend-selection RNG for reproducible sample ordering
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    if cli.single {
        run_single_mode(&cli, &mut rng).await
    } else {
        run_sweep_mode(&cli, &mut rng).await
    }
}

async fn run_single_mode(cli: &Cli, rng: &mut SmallRng) -> Result<()> {
    let burn = if cli.no_burn { 0 } else { BURN_IN_SAMPLES };
    let total = cli.samples as u64 + burn as u64;
    let bar = progress_bar(total)?;

    let timings = run_single(cli.qubits, cli.samples, burn, cli.shots, rng, || {
        bar.inc(1);
    })
    .await?;
    bar.finish_and_clear();

    println!(
        "qft width {}: {} samples ({} warm-up discarded)",
        cli.qubits, cli.samples, burn
    );
    for (backend, samples) in &timings {
        let Some(stats) = SampleStats::from_samples(samples) else {
            continue;
        };
        println!("{backend}: used {} times", stats.count);
        println!("    median {:.6}s", stats.median);
        println!("    mean   {:.6}s", stats.mean);
        if let Some(stdev) = stats.stdev {
            println!("    stdev  {stdev:.6}s");
        }
    }
    Ok(())
}

async fn run_sweep_mode(cli: &Cli, rng: &mut SmallRng) -> Result<()> {
    if cli.qubits < 2 {
        anyhow::bail!("sweep mode needs --qubits of at least 2");
    }
    let total = u64::from(cli.qubits - 1) * u64::from(cli.samples);
    let bar = progress_bar(total)?;

    let records = run_sweep(cli.qubits, cli.samples, cli.shots, rng, || {
        bar.inc(1);
    })
    .await?;
    bar.finish_and_clear();

    append_csv(&cli.out, &records)?;
    println!(
        "wrote {} samples across widths 2..={} to {}",
        records.len(),
        cli.qubits,
        cli.out.display()
    );
    Ok(())
}

/// Append records to the CSV file, writing the header only when the
/// file is new.
fn append_csv(path: &PathBuf, records: &[SweepRecord]) -> Result<()> {
    let new_file = !path.exists();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if new_file {
        writeln!(file, "{}", SweepRecord::CSV_HEADER)?;
    }
    for record in records {
        writeln!(file, "{}", record.csv_row())?;
    }
    Ok(())
}

fn progress_bar(total: u64) -> Result<ProgressBar> {
    let bar = ProgressBar::new(total);
    bar.set_style(ProgressStyle::with_template(
        "[{bar:50.cyan/blue}] {pos}/{len} ({percent}%)",
    )?);
    Ok(bar)
}
