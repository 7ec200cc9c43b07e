use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sleek_engine::{
    Config, DeviceProfile, DeviceTier, Encoding, Environment, MediaElement, Outcome, Rect,
    TranscodeOptions, Transcoder, classify, compression_profile,
};
use sleek_media::{decoder, svg};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "sleek")]
#[command(about = "sleek resource optimizer")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify a device environment.
    Classify {
        /// JSON environment; desktop defaults otherwise
        #[arg(long, value_name = "FILE")]
        env: Option<PathBuf>,
        #[arg(long)]
        viewport_width: Option<u32>,
        #[arg(long)]
        user_agent: Option<String>,
        #[arg(long)]
        cores: Option<u32>,
        #[arg(long)]
        memory_gb: Option<f32>,
    },
    /// Print the compression profile for a tier and longest image side.
    Profile {
        #[arg(long, default_value = "standard", value_parser = parse_tier)]
        tier: DeviceTier,
        #[arg(long, allow_negative_numbers = true)]
        max_side: i64,
    },
    /// Compress a raster image or rasterize an SVG.
    Transcode {
        #[arg(value_name = "FILE")]
        input: PathBuf,
        #[arg(long, default_value = "standard", value_parser = parse_tier)]
        tier: DeviceTier,
        /// Target supports WebP; applies to SVG output
        #[arg(long)]
        webp: bool,
        /// Display box width for SVG input
        #[arg(long, requires = "height")]
        width: Option<f64>,
        /// Display box height for SVG input
        #[arg(long, requires = "width")]
        height: Option<f64>,
        /// JSON pipeline config
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct ClassifyOutput {
    tier: &'static str,
    supports_webp: bool,
    vector_max_side: u32,
    vector_quality: f32,
}

#[derive(Debug, Serialize)]
struct ProfileOutput {
    tier: &'static str,
    max_side: i64,
    quality: f32,
    max_dimension: u32,
}

#[derive(Debug, Serialize)]
struct TranscodeOutput {
    input: String,
    outcome: &'static str,
    encoding: Option<&'static str>,
    width: Option<u32>,
    height: Option<u32>,
    bytes_in: usize,
    bytes_out: Option<usize>,
    output: Option<String>,
}

/// Encoded result of one transcode, before it is written out
struct Transcoded {
    outcome: Outcome,
    encoding: Option<Encoding>,
    size: Option<(u32, u32)>,
    bytes: Option<Vec<u8>>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let stdout = std::io::stdout();
    run_with(args, &mut stdout.lock())
}

/// Run with output going to `out`
pub fn run_with<I, T>(args: I, out: &mut impl Write) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Classify { env, viewport_width, user_agent, cores, memory_gb } => {
            let mut environment = match env {
                Some(path) => load_environment(&path)?,
                None => Environment::desktop(),
            };
            if let Some(width) = viewport_width {
                environment = environment.with_viewport_width(width);
            }
            if let Some(ua) = user_agent {
                environment = environment.with_user_agent(&ua);
            }
            if let Some(cores) = cores {
                environment = environment.with_hardware_concurrency(cores);
            }
            if let Some(gb) = memory_gb {
                environment = environment.with_device_memory(gb);
            }
            run_classify(&environment, out)
        }
        Commands::Profile { tier, max_side } => {
            let profile = compression_profile(tier, max_side);
            let payload = ProfileOutput {
                tier: tier.as_str(),
                max_side,
                quality: profile.quality,
                max_dimension: profile.max_dimension,
            };
            write_json(out, &payload)
        }
        Commands::Transcode { input, tier, webp, width, height, config, output } => {
            let options = match config {
                Some(path) => Config::load(&path)
                    .with_context(|| format!("failed to load config {}", path.display()))?
                    .transcode,
                None => TranscodeOptions::default(),
            };
            let transcoder = Transcoder::new(DeviceProfile::with_tier(tier, webp), options);
            let display = width.zip(height);
            run_transcode(&transcoder, &input, display, output.as_deref(), out)
        }
        Commands::Version => {
            writeln!(out, "{}", env!("CARGO_PKG_VERSION"))?;
            Ok(())
        }
    }
}

fn parse_tier(value: &str) -> Result<DeviceTier, String> {
    DeviceTier::parse(value).ok_or_else(|| format!("unknown tier `{value}` (standard, mobile, low-end)"))
}

fn load_environment(path: &Path) -> Result<Environment> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).context("invalid environment JSON")
}

fn run_classify(env: &Environment, out: &mut impl Write) -> Result<()> {
    let tier = classify(env);
    let device = DeviceProfile::with_tier(tier, env.supports_webp);
    let payload = ClassifyOutput {
        tier: tier.as_str(),
        supports_webp: device.supports_webp,
        vector_max_side: device.vector_max_side(),
        vector_quality: device.vector_quality(),
    };
    write_json(out, &payload)
}

fn run_transcode(
    transcoder: &Transcoder,
    input: &Path,
    display: Option<(f64, f64)>,
    output: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("file does not exist: {}", input.display());
    }
    let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let bytes_in = bytes.len();

    let transcoded = if svg::is_svg(&bytes) {
        transcode_vector(transcoder, bytes, display)?
    } else {
        transcode_raster(transcoder, input, bytes)?
    };

    let written = match (&transcoded.bytes, transcoded.encoding) {
        (Some(encoded), Some(encoding)) => {
            let path = output.map(ToOwned::to_owned).unwrap_or_else(|| default_output(input, encoding));
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
            }
            fs::write(&path, encoded).with_context(|| format!("failed to write {}", path.display()))?;
            Some(path)
        }
        _ => None,
    };

    let payload = TranscodeOutput {
        input: input.display().to_string(),
        outcome: outcome_label(transcoded.outcome),
        encoding: transcoded.encoding.map(|e| e.mime_type()),
        width: transcoded.size.map(|(w, _)| w),
        height: transcoded.size.map(|(_, h)| h),
        bytes_in,
        bytes_out: transcoded.bytes.as_ref().map(Vec::len),
        output: written.map(|p| p.display().to_string()),
    };
    write_json(out, &payload)
}

fn transcode_raster(transcoder: &Transcoder, input: &Path, bytes: Vec<u8>) -> Result<Transcoded> {
    let image = decoder::decode(&bytes).context("failed to decode image")?;
    let (width, height) = image.dimensions();

    let mut element = MediaElement::image(&input.display().to_string())
        .with_intrinsic(width as f64, height as f64)
        .with_payload(bytes);
    let outcome = transcoder.compress_raster(&mut element).context("failed to compress image")?;

    if outcome != Outcome::Committed {
        return Ok(Transcoded { outcome, encoding: None, size: None, bytes: None });
    }
    Ok(Transcoded {
        outcome,
        encoding: element.output_encoding,
        size: element.intrinsic.map(|s| (s.width as u32, s.height as u32)),
        bytes: element.payload,
    })
}

fn transcode_vector(
    transcoder: &Transcoder,
    bytes: Vec<u8>,
    display: Option<(f64, f64)>,
) -> Result<Transcoded> {
    let markup = String::from_utf8(bytes).context("SVG is not UTF-8")?;
    let (width, height) = display.unwrap_or((0.0, 0.0));

    let Some(display) = transcoder.display_box(&Rect::from_xywh(0.0, 0.0, width, height)) else {
        return Ok(Transcoded { outcome: Outcome::Skipped, encoding: None, size: None, bytes: None });
    };
    let raster = transcoder.rasterize_vector(&markup, display).context("failed to rasterize SVG")?;

    Ok(Transcoded {
        outcome: Outcome::Committed,
        encoding: Some(raster.encoding),
        size: Some((raster.width, raster.height)),
        bytes: Some(raster.bytes),
    })
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Committed => "committed",
        Outcome::Skipped => "skipped",
        Outcome::Discarded => "discarded",
        Outcome::Deferred => "deferred",
    }
}

fn default_output(input: &Path, encoding: Encoding) -> PathBuf {
    let ext = match encoding {
        Encoding::WebP => "webp",
        Encoding::Jpeg => "jpg",
        Encoding::Png => "png",
    };
    input.with_extension(format!("min.{ext}"))
}

fn write_json(out: &mut impl Write, payload: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(payload)?;
    writeln!(out, "{json}")?;
    Ok(())
}
