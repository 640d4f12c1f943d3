//! CLI binary for pdf2long.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2long::{
    convert, inspect, ConversionConfig, ConversionProgress, ProgressObserver, MAX_DPI, MIN_DPI,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress observer using indicatif ────────────────────────────────────

/// Terminal progress observer: renders a live progress bar and per-page log
/// lines using [indicatif]. The pipeline is strictly sequential, so events
/// always arrive in page order.
struct CliProgress {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Wall-clock start of the page currently being rendered.
    page_start: Mutex<Option<Instant>>,
}

impl CliProgress {
    /// Create an observer whose progress-bar length is set dynamically
    /// by `on_conversion_start` (fired once the document has been opened).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_conversion_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_start: Mutex::new(None),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Stitching");
    }
}

impl ConversionProgress for CliProgress {
    fn on_conversion_start(&self, source: &Path, output: &Path, dpi: u32, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Converting {} ({total_pages} pages, {dpi} dpi)",
                source.display()
            ))
        ));
        self.bar
            .println(format!("  {} {}", dim("→"), dim(&output.display().to_string())));
    }

    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        *self.page_start.lock().unwrap() = Some(Instant::now());
        self.bar
            .set_message(format!("rendering page {page_num}/{total_pages}"));
    }

    fn on_page_rendered(&self, page_num: usize, total_pages: usize, width: u32, height: u32) {
        let elapsed_ms = self
            .page_start
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<12}  {}",
            green("✓"),
            page_num,
            total_pages,
            dim(&format!("{width}x{height}")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_page_scaled(&self, page_num: usize, width: u32, height: u32) {
        self.bar.println(format!(
            "    {} page {page_num} scaled to {width}x{height}",
            dim("·")
        ));
    }

    fn on_canvas_allocated(&self, width: u32, height: u32) {
        self.bar
            .println(format!("{} {}", cyan("◆"), bold(&format!("Canvas {width}x{height}"))));
        self.bar.set_prefix("Pasting");
    }

    fn on_page_pasted(&self, page_num: usize, total_pages: usize, clipped: bool) {
        self.bar
            .set_message(format!("pasting page {page_num}/{total_pages}"));
        if clipped {
            self.bar.println(format!(
                "  {} Page {page_num} was wider than the canvas and has been clipped",
                yellow("⚠")
            ));
        }
    }

    fn on_conversion_complete(&self, output: &Path, bytes: u64) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {}  {}",
            green("✔"),
            bold(&output.display().to_string()),
            dim(&format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion — writes document_long_image.png next to the source
  pdf2long document.pdf

  # Explicit destination and render density
  pdf2long document.pdf output.png --dpi 200

  # Bound page width, JPEG output
  pdf2long slides.pdf slides.jpg --max-width 1200 --quality 90

  # Convert from a URL
  pdf2long https://arxiv.org/pdf/1706.03762 attention.png

  # Inspect PDF metadata, no conversion
  pdf2long --inspect-only document.pdf

  # Machine-readable result
  pdf2long --json document.pdf > result.json

OUTPUT FORMAT:
  Chosen from the destination extension (case-insensitive):
    .jpg / .jpeg   JPEG at --quality
    .png           PNG, maximum compression
    anything else  PNG; the path is rewritten to end in .png

ENVIRONMENT VARIABLES:
  PDF2LONG_DPI              Default render density
  PDF2LONG_QUALITY          Default JPEG quality
  PDFIUM_DYNAMIC_LIB_PATH   Directory containing libpdfium

SETUP:
  pdf2long renders through pdfium. Place libpdfium next to the pdf2long
  executable, install it as a system library, or point
  PDFIUM_DYNAMIC_LIB_PATH at a directory containing it.
"#;

/// Stitch every page of a PDF into one vertically-scrolling image.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2long",
    version,
    about = "Stitch every page of a PDF into one vertically-scrolling image",
    long_about = "Convert a PDF document (local file or URL) into a single tall raster image: \
every page is rendered at the requested DPI, optionally shrunk to a maximum width, and \
stacked top-to-bottom onto one white canvas, written as PNG or JPEG.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Output image path. Default: <input stem>_long_image.png next to the input.
    output: Option<PathBuf>,

    /// Rendering DPI (50–600). PDF native density is 72.
    #[arg(long, env = "PDF2LONG_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(MIN_DPI as i64..=MAX_DPI as i64))]
    dpi: u32,

    /// JPEG quality (1–100). Only used for .jpg/.jpeg destinations.
    #[arg(long, env = "PDF2LONG_QUALITY", default_value_t = 95,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Maximum page width in pixels; wider pages are downscaled proportionally.
    #[arg(long, env = "PDF2LONG_MAX_WIDTH")]
    max_width: Option<u32>,

    /// Cap on total canvas pixels; conversions above it fail rather than truncate.
    #[arg(long, default_value_t = pdf2long::config::DEFAULT_MAX_CANVAS_PIXELS)]
    max_canvas_pixels: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2LONG_PASSWORD")]
    password: Option<String>,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Output a structured JSON result instead of human-readable text.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PDF2LONG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2LONG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the final path.
    #[arg(short, long, env = "PDF2LONG_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "PDF2LONG_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input);
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    // clap's ranged value parsers have already rejected out-of-range DPI and
    // quality, so the builder's own validation cannot fire for those here.
    let progress: Option<ProgressObserver> = if show_progress {
        Some(CliProgress::new_dynamic() as Arc<dyn ConversionProgress>)
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .jpeg_quality(cli.quality)
        .max_canvas_pixels(cli.max_canvas_pixels)
        .download_timeout_secs(cli.download_timeout);
    if let Some(px) = cli.max_width {
        builder = builder.max_width(px);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(obs) = progress {
        builder = builder.progress(obs);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&cli.input, cli.output.as_deref(), &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        // The final path on stdout is the machine-consumable part; everything
        // else goes to stderr.
        println!("{}", output.output_path.display());
        if !cli.quiet && !show_progress {
            eprintln!(
                "{} pages → {}x{} px, {:.2} MB in {}ms",
                output.stats.total_pages,
                output.stats.canvas_width,
                output.stats.canvas_height,
                output.bytes_written as f64 / (1024.0 * 1024.0),
                output.stats.total_duration_ms
            );
        }
    }

    Ok(())
}
