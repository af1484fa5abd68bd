use anyhow::{Context, Result};
use heapgen_plot::plot::parse_cli;
use heapgen_plot::HeapStats;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let (input, output_path) = parse_cli();
    info!(
        "read data from {} and plot to {}",
        input.display(),
        output_path.display()
    );
    let stats = HeapStats::from_file(&input)
        .with_context(|| format!("could not read heap statistics from {}", input.display()))?;
    info!("read {} rows", stats.len());
    debug!("\n{}", stats);
    stats
        .plot_all(&output_path)
        .with_context(|| format!("could not plot to {}", output_path.display()))?;
    Ok(())
}
