mod cli;

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, bail};
use cdcbench::Registry;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let registry = Registry::with_builtin();

    if cli.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let path = cli.file.as_deref().context("no input file given")?;
    let config = cli
        .size_options()
        .resolve()
        .context("invalid chunk size options")?;
    let names = cli.algorithms(&registry);

    info!(
        file = %path.display(),
        min_size = config.min_size(),
        avg_size = config.avg_size(),
        max_size = config.max_size(),
        algorithms = names.len(),
        "starting benchmark"
    );

    let results = registry.run_all(&names, || File::open(path).map(BufReader::new), config);

    let mut failed = 0;
    for result in results {
        match result {
            Ok(result) => {
                println!("{result}");

                if let Some(step) = cli.distribution {
                    for bucket in result.size_distribution(step) {
                        println!("  {bucket}");
                    }
                }

                if let Some(csv) = &cli.csv {
                    result
                        .write_to_csv(csv)
                        .with_context(|| format!("failed to write {}", csv.display()))?;
                }
            }
            Err(err) => {
                eprintln!("error: {err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} runs failed", names.len());
    }

    Ok(())
}
