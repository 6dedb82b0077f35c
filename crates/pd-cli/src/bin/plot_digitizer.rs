use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use image::GrayImage;
use log::{info, warn};
use plot_digitizer::{
    EdgeMask, Extraction, GraphTypeHint, PipelineConfig, PipelineError, RefinedCurve, process_bode_pair,
    process_graph,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "plot_digitizer")]
#[command(about = "Extract curves from raster plot images")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Digitize a single plot
    #[command(name = "process")]
    Process(ProcessArgs),
    /// Digitize a Bode magnitude/phase pair
    #[command(name = "bode")]
    Bode(BodeArgs),
    /// Print the preset configuration for a graph type as JSON
    #[command(name = "config")]
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Directory receiving curves.json, mask.png and optionally curves.csv
    #[arg(long, default_value = "out")]
    out: PathBuf,
    /// Also write curves as a Color,X,Y CSV
    #[arg(long, default_value_t = false)]
    csv: bool,
    /// JSON file overriding preset fields
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct ProcessArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    /// generic, bode or nyquist
    #[arg(long, default_value_t = GraphTypeHint::Generic)]
    hint: GraphTypeHint,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
struct BodeArgs {
    #[arg(long, required = true)]
    magnitude: PathBuf,
    #[arg(long, required = true)]
    phase: PathBuf,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    #[arg(long, default_value_t = GraphTypeHint::Generic)]
    hint: GraphTypeHint,
}

#[derive(Debug, Clone, Serialize)]
struct CurveDto {
    label: String,
    source: usize,
    points: Vec<[f32; 2]>,
}

#[derive(Debug, Clone, Serialize)]
struct ResultDto {
    input: String,
    hint: GraphTypeHint,
    width: usize,
    height: usize,
    elapsed_ms: f64,
    curves: Vec<CurveDto>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Process(args) => run_process(args),
        Command::Bode(args) => run_bode(args),
        Command::Config(args) => run_config(args),
    }
}

fn run_process(args: ProcessArgs) -> Result<()> {
    ensure_file_exists(&args.input, "input")?;
    let cfg = load_config(args.hint, args.output.config.as_deref())?;

    let start = Instant::now();
    let extraction = process_graph(&args.input, &cfg)
        .with_context(|| format!("processing {}", args.input.display()))?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

    write_outputs(&args.output, &args.output.out, &args.input, cfg.hint, &extraction, elapsed_ms)
}

fn run_bode(args: BodeArgs) -> Result<()> {
    let cfg = load_config(GraphTypeHint::Bode, args.output.config.as_deref())?;

    let start = Instant::now();
    let pair = process_bode_pair(&args.magnitude, &args.phase, &cfg);
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

    let sides = [
        ("magnitude", &args.magnitude, pair.magnitude),
        ("phase", &args.phase, pair.phase),
    ];
    let mut failed = Vec::new();
    for (name, input, result) in sides {
        match result {
            Ok(extraction) => {
                let dir = args.output.out.join(name);
                write_outputs(&args.output, &dir, input, cfg.hint, &extraction, elapsed_ms)?;
            }
            Err(err) => {
                warn!("{name} plot {} failed: {err}", input.display());
                failed.push(describe_failure(name, &err));
            }
        }
    }

    if !failed.is_empty() {
        bail!("{}", failed.join("; "));
    }
    Ok(())
}

fn run_config(args: ConfigArgs) -> Result<()> {
    let cfg = PipelineConfig::for_hint(args.hint);
    let text = serde_json::to_string_pretty(&cfg).context("serializing config")?;
    println!("{text}");
    Ok(())
}

/// Preset for `hint`, with the fields present in `path` overriding it.
fn load_config(hint: GraphTypeHint, path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::for_hint(hint));
    };
    ensure_file_exists(path, "config")?;

    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let overrides: serde_json::Value =
        serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))?;

    let mut merged = serde_json::to_value(PipelineConfig::for_hint(hint)).context("serializing preset")?;
    merge_json(&mut merged, overrides);
    serde_json::from_value(merged).with_context(|| format!("invalid config in {}", path.display()))
}

fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn write_outputs(
    output: &OutputArgs,
    dir: &Path,
    input: &Path,
    hint: GraphTypeHint,
    extraction: &Extraction,
    elapsed_ms: f64,
) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating output directory {}", dir.display()))?;

    let mask = extraction.mask();
    save_mask(dir.join("mask.png"), mask)?;

    let curves = extraction.curves();
    if curves.is_empty() {
        warn!("no curves found in {}", input.display());
    }

    let dto = ResultDto {
        input: input.display().to_string(),
        hint,
        width: mask.width(),
        height: mask.height(),
        elapsed_ms,
        curves: curves
            .iter()
            .enumerate()
            .map(|(i, c)| CurveDto {
                label: curve_label(i),
                source: c.source,
                points: c.points.iter().map(|p| [p.x, p.y]).collect(),
            })
            .collect(),
    };
    write_json(dir.join("curves.json"), &dto)?;

    if output.csv {
        write_csv(dir.join("curves.csv"), curves)?;
    }

    info!(
        "{}: {} curve(s) written to {}",
        input.display(),
        curves.len(),
        dir.display()
    );
    Ok(())
}

fn curve_label(index: usize) -> String {
    format!("curve{}", index + 1)
}

fn describe_failure(name: &str, err: &PipelineError) -> String {
    if err.is_load_error() {
        format!("{name} plot could not be read: {err}")
    } else {
        format!("{name} plot failed: {err}")
    }
}

fn save_mask(path: PathBuf, mask: &EdgeMask) -> Result<()> {
    let img = mask.as_image();
    let gray = GrayImage::from_raw(img.width() as u32, img.height() as u32, img.data().to_vec())
        .context("constructing GrayImage from mask")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn write_csv(path: PathBuf, curves: &[RefinedCurve]) -> Result<()> {
    let mut file =
        fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "Color,X,Y").context("writing csv header")?;
    for (i, curve) in curves.iter().enumerate() {
        let label = curve_label(i);
        for p in &curve.points {
            writeln!(file, "{label},{},{}", p.x, p.y).context("writing csv row")?;
        }
    }
    Ok(())
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
