use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use storyset_core::config_file::{self, ConfigFile};
use storyset_ingest::{
    BackendOptions, BatchEvent, ExtractionStrategy, SegmentationMode, StoryExtractor,
};
use storyset_parsing::{DEFAULT_TITLE_WINDOW, SegmentationConfigBuilder};
use storyset_reporting::{DEFAULT_OUTPUT, ExportFormat};

mod output;

use output::ColorMode;

/// Story dataset builder - Turn a folder of story PDFs into an XML dataset
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract every matching file and write the dataset
    Build {
        /// Glob pattern or directory of input files
        #[arg(long = "path-regex", value_name = "PATTERN")]
        path_regex: String,

        #[command(flatten)]
        extraction: ExtractionArgs,

        /// Dataset file to write (default: stories.xml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Dataset format: xml or json
        #[arg(long)]
        format: Option<String>,

        /// Also write the names of unparsed files to this path, one per line
        #[arg(long)]
        unparsed_log: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Show how a single file would be split, without writing anything
    Preview {
        /// File to inspect
        file: PathBuf,

        #[command(flatten)]
        extraction: ExtractionArgs,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(Args, Debug)]
struct ExtractionArgs {
    /// Extraction strategy: basic, textractor or tika
    #[arg(long)]
    extractor: Option<String>,

    /// Apache Tika server endpoint
    #[arg(long)]
    tika_url: Option<String>,

    /// Title/body segmentation: run-length, filename or first-line
    #[arg(long)]
    segmenter: Option<String>,

    /// Number of leading characters scanned for the title break
    #[arg(long)]
    window: Option<usize>,

    /// Treat single-line-break splits as failures
    #[arg(long)]
    strict: bool,
}

/// Extraction settings after merging flags, environment and config file.
struct Settings {
    strategy: ExtractionStrategy,
    mode: SegmentationMode,
    backend: BackendOptions,
    extractor: StoryExtractor,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let config = config_file::load_config();

    match cli.command {
        Command::Build {
            path_regex,
            extraction,
            output,
            format,
            unparsed_log,
            no_color,
        } => build(
            &path_regex,
            &extraction,
            output,
            format,
            unparsed_log,
            ColorMode(!no_color),
            &config,
        ),
        Command::Preview {
            file,
            extraction,
            no_color,
        } => preview(&file, &extraction, ColorMode(!no_color), &config),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_settings(args: &ExtractionArgs, config: &ConfigFile) -> anyhow::Result<Settings> {
    let extraction = config.extraction.clone().unwrap_or_default();
    let segmentation = config.segmentation.clone().unwrap_or_default();

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let strategy = match args.extractor.as_deref().or(extraction.strategy.as_deref()) {
        Some(s) => s.parse::<ExtractionStrategy>()?,
        None => ExtractionStrategy::default(),
    };
    let mode = match args.segmenter.as_deref().or(segmentation.mode.as_deref()) {
        Some(s) => s.parse::<SegmentationMode>()?,
        None => strategy.default_mode(),
    };

    let defaults = BackendOptions::default();
    let backend = BackendOptions {
        tika_url: args
            .tika_url
            .clone()
            .or_else(|| std::env::var("STORYSET_TIKA_URL").ok())
            .or(extraction.tika_url)
            .unwrap_or(defaults.tika_url),
        timeout: extraction
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout),
        max_retries: extraction.max_retries.unwrap_or(defaults.max_retries),
    };

    let seg_config = SegmentationConfigBuilder::new()
        .title_window(
            args.window
                .or(segmentation.title_window)
                .unwrap_or(DEFAULT_TITLE_WINDOW),
        )
        .reject_low_confidence(
            args.strict || segmentation.reject_low_confidence.unwrap_or(false),
        )
        .expand_ligatures(segmentation.expand_ligatures.unwrap_or(true))
        .normalize_line_endings(segmentation.normalize_line_endings.unwrap_or(true))
        .strip_chars(segmentation.strip_chars.unwrap_or_default())
        .build()
        .context("invalid segmentation settings")?;

    Ok(Settings {
        strategy,
        mode,
        backend,
        extractor: StoryExtractor::with_config(seg_config),
    })
}

/// Warn early when the Tika server cannot be reached; each file would fail otherwise.
fn warn_if_tika_unreachable(
    settings: &Settings,
    w: &mut dyn Write,
    color: ColorMode,
) -> std::io::Result<()> {
    if settings.strategy != ExtractionStrategy::Tika {
        return Ok(());
    }
    let probe = storyset_tika::TikaBackend::new(settings.backend.tika_url.clone())
        .with_timeout(settings.backend.timeout);
    if let Err(msg) = probe.check_connectivity() {
        output::print_warning(w, &msg, color)?;
    }
    Ok(())
}

fn output_format(
    flag: Option<String>,
    config: Option<String>,
    path: &Path,
) -> anyhow::Result<ExportFormat> {
    if let Some(f) = flag.or(config) {
        return Ok(f.parse()?);
    }
    let is_json = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    Ok(if is_json {
        ExportFormat::Json
    } else {
        ExportFormat::Xml
    })
}

fn build(
    path_regex: &str,
    args: &ExtractionArgs,
    output: Option<PathBuf>,
    format: Option<String>,
    unparsed_log: Option<PathBuf>,
    color: ColorMode,
    config: &ConfigFile,
) -> anyhow::Result<()> {
    let settings = resolve_settings(args, config)?;
    let out_section = config.output.clone().unwrap_or_default();

    let output_path = output
        .or_else(|| std::env::var("STORYSET_OUTPUT").ok().map(PathBuf::from))
        .or_else(|| out_section.path.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let format = output_format(format, out_section.format, &output_path)?;
    let unparsed_log = unparsed_log.or_else(|| out_section.unparsed_log.map(PathBuf::from));

    let paths = storyset_ingest::enumerate_inputs(path_regex)?;
    let backend = storyset_ingest::build_backend(settings.strategy, &settings.backend)?;

    let mut stdout = std::io::stdout();
    warn_if_tika_unreachable(&settings, &mut stdout, color)?;
    if paths.is_empty() {
        output::print_warning(
            &mut stdout,
            &format!("no files matched {}", path_regex),
            color,
        )?;
    }
    output::print_run_header(
        &mut stdout,
        paths.len(),
        backend.name(),
        settings.mode.as_str(),
        color,
    )?;

    let bar = progress_bar(paths.len() as u64);
    let outcome = storyset_ingest::process_batch(
        &paths,
        backend.as_ref(),
        &settings.extractor,
        settings.mode,
        |event| match event {
            BatchEvent::Started { path, .. } => {
                bar.set_message(storyset_core::basename(path));
            }
            BatchEvent::Parsed { .. } => bar.inc(1),
            BatchEvent::Skipped {
                total, unparsed, ..
            } => {
                bar.suspend(|| {
                    let mut out = std::io::stdout();
                    if let Err(e) = output::print_skipped(&mut out, unparsed, total, color) {
                        tracing::debug!(error = %e, "could not print skipped file");
                    }
                });
                bar.inc(1);
            }
        },
    );
    bar.finish_and_clear();

    storyset_reporting::export_dataset(&outcome.records, format, &output_path)
        .with_context(|| format!("failed to write dataset to {}", output_path.display()))?;

    if let Some(ref log_path) = unparsed_log {
        storyset_reporting::write_unparsed_log(&outcome.unparsed_filenames(), log_path)
            .with_context(|| format!("failed to write unparsed log to {}", log_path.display()))?;
    }

    output::print_summary(
        &mut stdout,
        &outcome,
        &output_path.display().to_string(),
        color,
    )?;
    Ok(())
}

fn progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let bar = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

fn preview(
    file: &Path,
    args: &ExtractionArgs,
    color: ColorMode,
    config: &ConfigFile,
) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }

    let settings = resolve_settings(args, config)?;
    let backend = storyset_ingest::build_backend(settings.strategy, &settings.backend)?;

    let story = settings
        .extractor
        .extract_story(0, file, backend.as_ref(), settings.mode)
        .with_context(|| format!("could not split {}", file.display()))?;

    let mut stdout = std::io::stdout();
    output::print_preview(&mut stdout, &story, color)?;
    Ok(())
}
