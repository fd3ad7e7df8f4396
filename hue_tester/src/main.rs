use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use hue_lens::{
    ClassifierStrategy, ColorPipeline, Deficiency, HueLensConfig, ModeState, ParallelCorrector,
    svg_definitions,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    NearestPalette,
    HslBanded,
}

impl From<StrategyArg> for ClassifierStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::NearestPalette => ClassifierStrategy::NearestPalette,
            StrategyArg::HslBanded => ClassifierStrategy::HslBanded,
        }
    }
}

/// Names the color under a point of an image and writes a corrected copy.
#[derive(Debug, Parser)]
#[command(name = "hue_tester", version)]
struct Args {
    /// Image to sample from.
    input: PathBuf,

    /// Source pixel column (or display column with --display-size).
    #[arg(long, default_value_t = 0.0)]
    x: f64,

    /// Source pixel row (or display row with --display-size).
    #[arg(long, default_value_t = 0.0)]
    y: f64,

    /// Treat --x/--y as a tap on the image displayed at WIDTHxHEIGHT.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_display_size)]
    display_size: Option<(f64, f64)>,

    /// normal, protan, deutan or tritan.
    #[arg(long, short, default_value = "normal")]
    deficiency: Deficiency,

    /// Sample the source with correction switched off.
    #[arg(long)]
    disabled: bool,

    /// Overrides the classifier strategy from the configuration.
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// JSON configuration file.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Where to write the corrected PNG.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Where to write the SVG filter definitions.
    #[arg(long)]
    svg: Option<PathBuf>,
}

fn parse_display_size(value: &str) -> Result<(f64, f64), String> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value}"))?;
    let parse = |part: &str| part.trim().parse::<f64>().map_err(|e| e.to_string());
    Ok((parse(width)?, parse(height)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- 1. Argument Parsing & Setup ---
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => HueLensConfig::from_path(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => HueLensConfig::default(),
    };
    if let Some(strategy) = args.strategy {
        config.classifier.strategy = strategy.into();
    }

    // --- 2. Image Loading ---
    let source: hue_lens::Frame = image::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?
        .into();
    info!(width = source.width(), height = source.height(), "image loaded");

    // --- 3. Pipeline Initialization ---
    let mut pipeline = ColorPipeline::new(config)?;
    pipeline.set_mode(ModeState::new(args.deficiency, !args.disabled));

    // --- 4. Sampling ---
    let report = match args.display_size {
        Some((width, height)) => pipeline.sample_scaled(&source, args.x, args.y, width, height)?,
        None => {
            let (width, height) = (source.width() as f64, source.height() as f64);
            pipeline.sample_scaled(&source, args.x, args.y, width, height)?
        }
    };
    println!(
        "({}, {}) {} -> {} (displayed as {})",
        report.x, report.y, report.color, report.name, report.displayed
    );

    // --- 5. Output ---
    if let Some(output) = &args.output {
        let corrector = ParallelCorrector::for_pipeline(&pipeline);
        let corrected = corrector.correct_frame(&source, pipeline.mode()).await?;
        corrected
            .save_png(output)
            .with_context(|| format!("writing {}", output.display()))?;
        info!(path = %output.display(), filter = %pipeline.surface_filter().css_value(), "corrected image written");
        corrector.shutdown().await;
    }

    if let Some(svg) = &args.svg {
        std::fs::write(svg, svg_definitions(pipeline.engine()))
            .with_context(|| format!("writing {}", svg.display()))?;
        info!(path = %svg.display(), "filter definitions written");
    }

    Ok(())
}
