pub use crate::chart::text::Typeface;
pub use crate::config::{ChartConfig, Color, TextStyle};
pub use crate::error::{RenderError, Result};
pub use crate::results::{ResultRow, format_seconds, load_results};

use crate::chart::layout::ChartLayout;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt::Layer, prelude::*, registry::Registry};

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

pub mod chart;
pub mod config;
mod error;
pub mod output;
pub mod results;

/// Input file used when none is given.
pub const DEFAULT_INPUT: &str = "results.csv";
/// Output image written when none is given.
pub const DEFAULT_OUTPUT: &str = "benchmark_viz.png";

/// Installs the global tracing subscriber, logging to stderr.
///
/// The filter is read from `RUST_LOG` and defaults to `info`. Returns the guard
/// of the non-blocking writer, which must be held until the process exits so
/// buffered lines are flushed. Returns `None` if a subscriber is already set.
pub fn init_tracing() -> Option<WorkerGuard> {
    let (non_blocking_stderr, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());

    let stderr_layer = Layer::new()
        .with_writer(non_blocking_stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true);

    Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(stderr_layer)
        .try_init()
        .ok()
        .map(|_| stderr_guard)
}

/// Outcome of a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub output_path: PathBuf,
    /// Pixel width of the written image
    pub width: u32,
    /// Pixel height of the written image
    pub height: u32,
    /// Number of bars drawn, one per distinct command
    pub bars: usize,
}

impl RenderReport {
    /// The single line printed once the chart is on disk.
    pub fn confirmation_message(&self) -> String {
        format!("✅ Visualization saved to {}", self.output_path.display())
    }
}

/// Renders benchmark result files as horizontal bar charts.
#[derive(Debug)]
pub struct ChartRenderer {
    config: ChartConfig,
    typeface: Typeface,
}

impl ChartRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self {
            config,
            typeface: Typeface::Bitmap,
        }
    }

    /// Uses `typeface` for all chart text instead of the embedded bitmap font.
    pub fn with_typeface(mut self, typeface: Typeface) -> Self {
        self.typeface = typeface;
        self
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Reads `input_path`, draws the chart and writes it as a PNG to `output_path`.
    ///
    /// The image is composed and encoded completely in memory before anything
    /// is written, and the write itself is atomic, so a failed render never
    /// leaves a partial image behind. An existing file at `output_path` is
    /// overwritten.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InputNotFound`] if `input_path` does not exist.
    /// - [`RenderError::InputReadError`] if `input_path` cannot be read.
    /// - [`RenderError::MalformedInput`] if the CSV lacks `command` or `mean`,
    ///   or a mean is not a non-negative number.
    /// - [`RenderError::OutputWriteError`] if `output_path` cannot be written.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use benchviz::{ChartConfig, ChartRenderer};
    /// # use std::path::Path;
    /// # fn example() -> Result<(), benchviz::RenderError> {
    /// let renderer = ChartRenderer::new(ChartConfig::default());
    /// let report = renderer.render(Path::new("results.csv"), Path::new("benchmark_viz.png"))?;
    /// println!("{}", report.confirmation_message());
    /// # Ok(())
    /// # }
    /// ```
    pub fn render(&self, input_path: &Path, output_path: &Path) -> Result<RenderReport> {
        let rows = load_results(input_path)?;
        let layout = ChartLayout::compute(&rows, &self.config, &self.typeface);
        let bars = layout.bars.len();

        if bars < rows.len() {
            tracing::info!(
                target: "benchviz::chart",
                "Merged {} rows into {} bars by averaging repeated commands",
                rows.len(),
                bars
            );
        }
        if bars > self.config.palette.len() {
            tracing::info!(
                target: "benchviz::chart",
                "{} commands but {} palette colors, cycling colors",
                bars,
                self.config.palette.len()
            );
        }
        if !output::has_png_extension(output_path) {
            tracing::warn!(
                target: "benchviz::output",
                "Output {} does not end in .png, writing PNG data anyway",
                output_path.display()
            );
        }

        let image = chart::draw_layout(&layout, &self.config, &self.typeface);
        let (width, height) = image.dimensions();
        let data = output::encode_png(image)?;
        output::write_atomic(output_path, &data)?;

        tracing::info!(
            target: "benchviz::output",
            "Rendered {} bars into {}x{} image at {}",
            bars,
            width,
            height,
            output_path.display()
        );

        Ok(RenderReport {
            output_path: output_path.to_path_buf(),
            width,
            height,
            bars,
        })
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(ChartConfig::default())
    }
}

/// Renders `input_path` to `output_path` with the default styling.
pub fn render(input_path: &Path, output_path: &Path) -> Result<RenderReport> {
    ChartRenderer::default().render(input_path, output_path)
}

/// Renders `input_path` to `output_path` with a custom configuration.
pub fn render_with_config(
    input_path: &Path,
    output_path: &Path,
    config: &ChartConfig,
) -> Result<RenderReport> {
    ChartRenderer::new(config.clone()).render(input_path, output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fast_config() -> ChartConfig {
        ChartConfig {
            dpi: 30,
            ..ChartConfig::default()
        }
    }

    fn write_results(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join(DEFAULT_INPUT);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_confirmation_message() {
        let report = RenderReport {
            output_path: PathBuf::from("benchmark_viz.png"),
            width: 10,
            height: 10,
            bars: 2,
        };
        assert_eq!(
            report.confirmation_message(),
            "✅ Visualization saved to benchmark_viz.png"
        );
    }

    #[test]
    fn test_render_report() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_results(&temp_dir, "command,mean\nGo,1.234\nPHP,0.567\n");
        let output = temp_dir.path().join(DEFAULT_OUTPUT);

        let report = render_with_config(&input, &output, &fast_config()).unwrap();

        assert_eq!(report.bars, 2);
        assert_eq!(report.output_path, output);
        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (report.width, report.height));
    }

    #[test]
    fn test_render_to_non_png_extension_still_writes_png() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_results(&temp_dir, "command,mean\nGo,1.0\n");
        let output = temp_dir.path().join("chart.img");

        render_with_config(&input, &output, &fast_config()).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_report_counts_distinct_commands() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_results(&temp_dir, "command,mean\nGo,1.0\nPHP,0.5\nGo,1.2\n");
        let output = temp_dir.path().join(DEFAULT_OUTPUT);

        let report = render_with_config(&input, &output, &fast_config()).unwrap();
        assert_eq!(report.bars, 2);
    }

    #[test]
    fn test_renderer_config_accessor() {
        let renderer = ChartRenderer::new(fast_config());
        assert_eq!(renderer.config().dpi, 30);
        assert_eq!(ChartRenderer::default().config(), &ChartConfig::default());
    }

    #[test]
    fn test_init_tracing_twice() {
        let _first = init_tracing();
        assert!(init_tracing().is_none());
    }
}
