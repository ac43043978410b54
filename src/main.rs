extern crate smart_bem;

use anyhow::anyhow;
use clap::Parser;
use smart_bem::output::FileOutput;
use smart_bem::run_project;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct SmartBemArgs {
    input_file: String,
    /// directory for the results, summary and averages CSV files; defaults to the input file's directory
    #[arg(long, short)]
    output_dir: Option<PathBuf>,
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn main() -> anyhow::Result<()> {
    let args = SmartBemArgs::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let input_path = Path::new(&args.input_file);
    let input_file_stem = input_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| anyhow!("Could not determine a file stem for {}", args.input_file))?;
    let output_dir = match args.output_dir {
        Some(dir) => dir,
        None => input_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    // each output key is substituted for the {} placeholder
    let output = FileOutput::new(output_dir.clone(), format!("{input_file_stem}_{{}}.csv"));

    let results = run_project(BufReader::new(File::open(input_path)?), &output)?;

    info!(
        "Simulated {} timesteps; results written to {}",
        results.timesteps.len(),
        output_dir.display()
    );

    Ok(())
}
