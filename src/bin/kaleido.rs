use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kaleido", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an image through one of the kaleidoscope modes.
    Render(RenderArgs),
    /// List the available modes.
    Modes,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input image (any format the `image` crate decodes).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image; the format follows the extension.
    #[arg(long)]
    out: PathBuf,

    /// Effect parameter JSON. Flags below override its fields.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Mode tag (see `kaleido modes`). Switching mode resets mode-specific fields.
    #[arg(long)]
    mode: Option<String>,

    /// Radial segment count (2-24).
    #[arg(long)]
    segments: Option<u32>,

    /// Tile size in percent of the source's short side (tiled modes).
    #[arg(long = "tile-size")]
    tile_size: Option<f64>,

    /// Tile height / width ratio (rectangle mode).
    #[arg(long)]
    aspect: Option<f64>,

    /// Lattice rotation in degrees.
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<f64>,

    #[arg(long)]
    zoom: Option<f64>,

    /// Sampling centre, percent of source width.
    #[arg(long = "center-x")]
    center_x: Option<f64>,

    /// Sampling centre, percent of source height.
    #[arg(long = "center-y")]
    center_y: Option<f64>,

    /// Output width; defaults to the source width.
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Output height; defaults to the source height.
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Render from the preview-sized source instead of full resolution.
    #[arg(long)]
    preview: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Modes => {
            for e in &kaleido::MODES {
                println!("{:<16}{}", e.tag, e.display_name);
            }
            Ok(())
        }
    }
}

fn read_params(args: &RenderArgs) -> anyhow::Result<kaleido::EffectParameters> {
    let mut p = match &args.params {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read params '{}'", path.display()))?;
            kaleido::EffectParameters::from_json(&json)
                .with_context(|| format!("parse params '{}'", path.display()))?
        }
        None => kaleido::EffectParameters::defaults(kaleido::Mode::Radial),
    };

    if let Some(tag) = &args.mode {
        let mode = kaleido::Mode::from_tag(tag)?;
        if mode != p.mode() {
            p.geometry = kaleido::Geometry::defaults(mode);
        }
    }

    if let Some(n) = args.segments {
        let kaleido::Geometry::Radial { num_segments } = &mut p.geometry else {
            anyhow::bail!("--segments only applies to radial mode");
        };
        *num_segments = n;
    }
    if let Some(size) = args.tile_size {
        match &mut p.geometry {
            kaleido::Geometry::Radial { .. } => {
                anyhow::bail!("--tile-size does not apply to radial mode")
            }
            kaleido::Geometry::Rectangle { tile_size_pct, .. }
            | kaleido::Geometry::Triangle45 { tile_size_pct }
            | kaleido::Geometry::Triangle60 { tile_size_pct }
            | kaleido::Geometry::Triangle3060 { tile_size_pct } => *tile_size_pct = size,
        }
    }
    if let Some(a) = args.aspect {
        let kaleido::Geometry::Rectangle { tile_aspect, .. } = &mut p.geometry else {
            anyhow::bail!("--aspect only applies to rectangle mode");
        };
        *tile_aspect = a;
    }

    let c = &mut p.common;
    if let Some(v) = args.rotation {
        c.rotation_deg = v;
    }
    if let Some(v) = args.zoom {
        c.zoom = v;
    }
    if let Some(v) = args.center_x {
        c.center_x_pct = v;
    }
    if let Some(v) = args.center_y {
        c.center_y_pct = v;
    }

    p.validate()?;
    Ok(p)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let params = read_params(&args)?;

    let decoded = image::open(&args.in_path)
        .with_context(|| format!("open image '{}'", args.in_path.display()))?;
    let mut source = Arc::new(kaleido::SourceImage::from_dynamic(decoded)?);
    if args.preview {
        source = kaleido::prepare_preview(&source, kaleido::PREVIEW_MAX_DIM)?;
    }

    let output = match (args.width, args.height) {
        (Some(w), Some(h)) => Some(kaleido::OutputSpec::new(w, h)?),
        _ => None,
    };

    let result = kaleido::export_full_resolution(&source, &params, output)?;
    write_image(result, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn write_image(result: kaleido::RenderResult, out: &Path) -> anyhow::Result<()> {
    let mut img = result.into_dynamic()?;
    let is_jpeg = out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "jpg" | "jpeg"));
    if is_jpeg && img.color().has_alpha() {
        img = image::DynamicImage::ImageRgb8(img.to_rgb8());
    }

    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save(out)
        .with_context(|| format!("write image '{}'", out.display()))?;
    Ok(())
}
