use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stagecast::{
    Compositor, EngineConfig, FitMode, FixedClock, HostSurface, InMemoryTemplateStore, Template,
};

#[derive(Parser, Debug)]
#[command(name = "stagecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a template to a PNG.
    Frame(FrameArgs),
    /// Render a template and print the overlay nodes as JSON.
    Overlays(SceneArgs),
    /// Parse a template and fail on any problem the renderer would have to work around.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Input template JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Screen width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Screen height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Fit mode (fit, fill, stretch); overrides the config file.
    #[arg(long)]
    fit: Option<FitMode>,

    /// Wall-clock instant for live elements (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    at: Option<DateTime<Utc>>,

    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Composite overlay node placeholders under and over the raster.
    #[arg(long)]
    preview: bool,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input template JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Overlays(args) => cmd_overlays(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 instant '{s}': {e}"))
}

fn load_config(args: &SceneArgs) -> anyhow::Result<EngineConfig> {
    let mut cfg = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::from_env()?,
    };
    if let Some(fit) = args.fit {
        cfg.fit_mode = fit;
    }
    if args.config.is_none() && std::env::var_os("STAGECAST_ASSETS").is_none() {
        cfg.assets_root = args
            .in_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
    }
    Ok(cfg)
}

/// Render the scene once and apply every image load before returning.
fn render_scene(args: &SceneArgs) -> anyhow::Result<Compositor> {
    let template = Template::from_path(&args.in_path)?;
    let cfg = load_config(args)?;
    let store = Arc::new(InMemoryTemplateStore::new(template));

    // The default filesystem loader decodes inline, so every load completes before the first pump.
    let mut compositor = Compositor::new(store, cfg);
    if let Some(at) = args.at {
        compositor = compositor.with_clock(Arc::new(FixedClock::new(at)));
    }
    compositor.attach_host(HostSurface::new("cli", args.width, args.height)?);

    let report = compositor
        .render()
        .with_context(|| format!("render template '{}'", args.in_path.display()))?;
    tracing::info!(
        elements = report.elements,
        failed = report.failed,
        skipped = report.skipped,
        "rendered"
    );

    // A background completion can queue element loads, so pump until idle.
    for _ in 0..4 {
        compositor.pump(Instant::now());
        if !compositor.has_pending_loads() {
            break;
        }
    }
    Ok(compositor)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let compositor = render_scene(&args.scene)?;
    let host = compositor
        .host()
        .context("host surface detached during render")?;
    let frame = if args.preview {
        host.preview()
    } else {
        host.frame()
    };

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame.write_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_overlays(args: SceneArgs) -> anyhow::Result<()> {
    let compositor = render_scene(&args)?;
    let host = compositor
        .host()
        .context("host surface detached during render")?;
    let json = serde_json::to_string_pretty(&host.overlay().nodes())
        .context("serialize overlay nodes")?;
    println!("{json}");
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let template = Template::from_path(&args.in_path)?;
    template.validate()?;
    let issues = template.issues();
    for issue in &issues {
        eprintln!("warning: {issue}");
    }
    if !issues.is_empty() {
        anyhow::bail!("{} template issue(s)", issues.len());
    }
    eprintln!(
        "ok: {} elements ({} skipped)",
        template.elements().len(),
        template.skipped_elements()
    );
    Ok(())
}
