use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use benchviz::{ChartConfig, ChartRenderer, DEFAULT_INPUT, DEFAULT_OUTPUT, Typeface};

/// Render hyperfine benchmark results as a horizontal bar chart
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Results CSV exported with `hyperfine --export-csv`
    #[clap(value_name = "INPUT", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// PNG file to write
    #[clap(value_name = "OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// TrueType font for chart text instead of the built-in bitmap font
    #[clap(long, value_name = "PATH")]
    font: Option<PathBuf>,

    /// Output resolution in dots per inch
    #[clap(long, value_name = "DPI", default_value_t = 300, value_parser = clap::value_parser!(u32).range(1..=1200))]
    dpi: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _tracing_guard = benchviz::init_tracing();

    let typeface = match &args.font {
        Some(path) => Typeface::load(path)?,
        None => Typeface::Bitmap,
    };
    let config = ChartConfig {
        dpi: args.dpi,
        ..ChartConfig::default()
    };

    tracing::debug!(target: "benchviz::cli", "Rendering with {:?}", args);

    let report = ChartRenderer::new(config)
        .with_typeface(typeface)
        .render(&args.input, &args.output)
        .with_context(|| format!("Failed to visualize {}", args.input.display()))?;

    println!("{}", report.confirmation_message());

    Ok(())
}
