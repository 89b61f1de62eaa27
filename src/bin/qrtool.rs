use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chroma_qr::models::ColorChannel;
use chroma_qr::pipeline::scan_image_with_telemetry;
use chroma_qr::tools::{bench_limit_from_env, dataset_iter, dataset_root_from_env, load_image, save_image, sibling_path};
use chroma_qr::{ChannelSet, EmptyChannelPolicy, EngineKind, ScanOptions, compose_channels, isolate_channel};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qrtool", version, about = "Multi-channel QR scanning tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode one image: raw attempt plus the selected channels
    Decode {
        #[arg(long)]
        image: PathBuf,
        /// Channels to probe after the raw attempt (`rgb`, `r,b`, `none`, ...)
        #[arg(long, default_value = "rgb")]
        channels: String,
        /// Detection engine
        #[arg(long, default_value = "rqrr")]
        engine: String,
        /// Leave channels that decode nothing out of the output
        #[arg(long)]
        omit_empty: bool,
        /// Print corner geometry
        #[arg(long)]
        geometry: bool,
    },
    /// Write the red, green and blue isolations of an image next to it
    Split {
        #[arg(long)]
        image: PathBuf,
        /// Output directory (defaults to the image's directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Build a color code from three single-code images
    Compose {
        #[arg(long)]
        red: PathBuf,
        #[arg(long)]
        green: PathBuf,
        #[arg(long)]
        blue: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Compare raw and multi-channel hit rates over a directory tree
    Batch {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value = "rqrr")]
        engine: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Decode {
            image,
            channels,
            engine,
            omit_empty,
            geometry,
        } => decode_cmd(&image, &channels, &engine, omit_empty, geometry),
        Command::Split { image, out } => split_cmd(&image, out.as_deref()),
        Command::Compose {
            red,
            green,
            blue,
            out,
        } => compose_cmd(&red, &green, &blue, &out),
        Command::Batch {
            root,
            limit,
            engine,
        } => batch_cmd(root, limit, &engine),
    }
}

fn decode_cmd(image: &Path, channels: &str, engine: &str, omit_empty: bool, geometry: bool) -> Result<()> {
    let Some(channels) = ChannelSet::parse(channels) else {
        bail!("invalid channel list '{channels}'");
    };
    let engine = engine.parse::<EngineKind>()?.build()?;
    let frame = load_image(image).with_context(|| format!("failed to load {}", image.display()))?;

    let policy = if omit_empty {
        EmptyChannelPolicy::Omit
    } else {
        EmptyChannelPolicy::Report
    };
    let options = ScanOptions::default()
        .with_channels(channels)
        .with_geometry(geometry)
        .with_channel_geometry(geometry)
        .with_empty_channels(policy);

    let (result, tel) = scan_image_with_telemetry(&engine, &frame, &options)?;
    println!(
        "Image: {} ({}x{}) engine={} attempts={} time={:.2}ms",
        image.display(),
        frame.width(),
        frame.height(),
        engine.name(),
        tel.attempts,
        tel.total().as_secs_f64() * 1000.0
    );

    if result.is_empty() {
        println!("No QR code found");
        return Ok(());
    }
    for entry in &result.entries {
        println!("  {:<5} {}", entry.label.as_str(), entry.text);
        if let Some(g) = &entry.geometry {
            for quad in g.quads() {
                println!("        corners {:?}", quad.corners.map(|p| (p.x, p.y)));
            }
        }
    }
    if !channels.is_empty() {
        println!("  R ; G ; B = {}", result.channel_summary());
    }
    if let Some(g) = &result.geometry {
        for (i, quad) in g.quads().iter().enumerate() {
            println!("  code {i} corners {:?}", quad.corners.map(|p| (p.x, p.y)));
        }
    }
    Ok(())
}

fn split_cmd(image: &Path, out: Option<&Path>) -> Result<()> {
    let frame = load_image(image).with_context(|| format!("failed to load {}", image.display()))?;
    let base = match out {
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
            dir.join(image.file_name().unwrap_or_default())
        }
        None => image.to_path_buf(),
    };

    for channel in ColorChannel::ALL {
        let label = chroma_qr::ChannelLabel::from(channel);
        let path = sibling_path(&base, label.as_str(), "png");
        save_image(&isolate_channel(&frame, channel), &path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{label}: {}", path.display());
    }
    Ok(())
}

fn compose_cmd(red: &Path, green: &Path, blue: &Path, out: &Path) -> Result<()> {
    let load = |p: &Path| load_image(p).with_context(|| format!("failed to load {}", p.display()));
    let composite = compose_channels(&load(red)?, &load(green)?, &load(blue)?)?;
    save_image(&composite, out).with_context(|| format!("failed to write {}", out.display()))?;
    println!(
        "Wrote {} ({}x{})",
        out.display(),
        composite.width(),
        composite.height()
    );
    Ok(())
}

fn batch_cmd(root: Option<PathBuf>, limit: Option<usize>, engine: &str) -> Result<()> {
    let root = root.unwrap_or_else(dataset_root_from_env);
    let limit = limit.or_else(bench_limit_from_env);
    let engine = engine.parse::<EngineKind>()?.build()?;
    let raw_only = ScanOptions::default();
    let multi = ScanOptions::multi_channel().with_empty_channels(EmptyChannelPolicy::Omit);

    let mut total = 0usize;
    let mut raw_hits = 0usize;
    let mut channel_payloads = 0usize;
    let mut errors = 0usize;
    let start = Instant::now();

    for path in dataset_iter(&root, limit) {
        let frame = match load_image(&path) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable image");
                continue;
            }
        };
        total += 1;

        match scan_image_with_telemetry(&engine, &frame, &raw_only) {
            Ok((result, _)) if !result.is_empty() => raw_hits += 1,
            Ok(_) => {}
            Err(err) => {
                errors += 1;
                warn!(path = %path.display(), kind = err.kind(), "raw scan failed");
                continue;
            }
        }
        match scan_image_with_telemetry(&engine, &frame, &multi) {
            Ok((result, _)) => {
                let extra = result
                    .entries
                    .iter()
                    .filter(|e| e.label != chroma_qr::ChannelLabel::Raw)
                    .count();
                channel_payloads += extra;
                info!(path = %path.display(), entries = result.len(), "scanned");
            }
            Err(err) => {
                errors += 1;
                warn!(path = %path.display(), kind = err.kind(), "multi-channel scan failed");
            }
        }
    }

    if total == 0 {
        bail!("no images found under {}", root.display());
    }
    let rate = raw_hits as f64 / total as f64 * 100.0;
    println!("Root: {}", root.display());
    println!("Images: {total}  errors: {errors}");
    println!("Raw hit rate: {raw_hits}/{total} ({rate:.1}%)");
    println!("Channel payloads: {channel_payloads}");
    println!("Elapsed: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}
