use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

use sedimenta::{
    BlendMode, Canvas, CaptureParams, EngineOptions, LayeringMode, Pixmap, RenderConfig,
    Renderer, SedimentProcessor, Session, SyntheticSource, ViewMode,
};

#[derive(Parser, Debug)]
#[command(name = "sedimenta", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a synthetic capture session and write the final frame as a PNG.
    Demo(DemoArgs),
    /// List the available layering and blend modes.
    Modes,
}

#[derive(Parser, Debug)]
struct DemoArgs {
    /// Number of frames to capture.
    #[arg(long, default_value_t = 240)]
    frames: u64,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 960)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 540)]
    height: u32,

    /// Captured slit width in pixels.
    #[arg(long, default_value_t = 6)]
    slit_width: u32,

    /// Layer store capacity.
    #[arg(long, default_value_t = 500)]
    max_layers: usize,

    /// Layering mode name (unknown names fall back to standard).
    #[arg(long, default_value = "standard")]
    layering: String,

    /// Blend mode name (unknown names fall back to normal).
    #[arg(long, default_value = "normal")]
    blend: String,

    /// View to render.
    #[arg(long, value_enum, default_value_t = ViewChoice::Normal)]
    view: ViewChoice,

    /// Seed for the deterministic random source.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Print engine statistics as JSON after the run.
    #[arg(long)]
    stats: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ViewChoice {
    Normal,
    Wireframe,
    Heatmap,
    Sediment,
}

impl From<ViewChoice> for ViewMode {
    fn from(choice: ViewChoice) -> Self {
        match choice {
            ViewChoice::Normal => ViewMode::Normal,
            ViewChoice::Wireframe => ViewMode::Wireframe,
            ViewChoice::Heatmap => ViewMode::Heatmap,
            ViewChoice::Sediment => ViewMode::Sediment,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Demo(args) => cmd_demo(args),
        Command::Modes => cmd_modes(),
    }
}

fn cmd_demo(args: DemoArgs) -> anyhow::Result<()> {
    let canvas = Canvas::new(args.width, args.height).context("canvas size")?;
    let layering = LayeringMode::from_name(&args.layering);
    let blend = BlendMode::from_name(&args.blend);

    let options = EngineOptions {
        max_layers: args.max_layers,
        layering_mode: layering,
        blend_mode: blend,
        seed: args.seed,
        ..EngineOptions::default()
    };
    let wave_amplitude = options.wave_amplitude;
    let mut session = Session::new(SedimentProcessor::new(options).context("engine options")?);

    let params = CaptureParams {
        layering_mode: layering,
        blend_mode: blend,
        ..CaptureParams::default()
    };
    let mut source = SyntheticSource::new(args.slit_width, args.height, args.frames);

    session.start();
    let mut last_timestamp = 0;
    while let Some(outcome) = session.frame(&mut source, &params) {
        let _ = outcome;
        last_timestamp = session
            .processor()
            .clock()
            .last_timestamp_ms
            .unwrap_or(last_timestamp);
    }
    session.stop();

    let config = RenderConfig {
        view_mode: args.view.into(),
        layering_mode: layering,
        blend_mode: blend,
        max_layers_display: args.max_layers,
        ..RenderConfig::default()
    };

    let renderer = Renderer::new(wave_amplitude);
    let mut pixmap = Pixmap::new(canvas);
    let mut render_rng = ChaCha8Rng::seed_from_u64(args.seed.wrapping_add(1));
    let processor = session.processor();
    renderer
        .render(
            processor.store(),
            &config,
            processor.clock(),
            last_timestamp,
            &mut render_rng,
            &mut pixmap,
        )
        .context("render frame")?;

    pixmap
        .write_png(&args.out)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    println!(
        "captured {} layers, wrote {}",
        processor.store().len(),
        args.out.display()
    );

    if args.stats {
        let stats = processor.stats();
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    Ok(())
}

fn cmd_modes() -> anyhow::Result<()> {
    println!("layering modes:");
    for mode in LayeringMode::ALL {
        println!("  {}", mode.name());
    }
    println!("blend modes:");
    for mode in BlendMode::ALL {
        println!("  {}", mode.name());
    }
    Ok(())
}
