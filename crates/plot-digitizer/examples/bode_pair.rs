//! Example: digitize the magnitude and phase plots of a Bode diagram.
//!
//! Both images go through the pipeline with the Bode preset, concurrently
//! when the `parallel` feature is on. Curves for each plot are written to a
//! JSON file next to the magnitude image; per-plot timing goes to stdout.
//! A plot that fails to load is reported and does not stop the other.
//!
//! Run from the workspace root:
//!   cargo run -p plot-digitizer --example bode_pair -- --help
//!   cargo run -p plot-digitizer --example bode_pair -- --magnitude mag.png --phase phase.png

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use plot_digitizer::{Extraction, GraphTypeHint, PipelineConfig, PipelineError, process_bode_pair};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(about = "Extract curves from a Bode magnitude/phase image pair")]
struct Args {
    /// Magnitude plot (PNG or JPEG)
    #[arg(long)]
    magnitude: PathBuf,

    /// Phase plot (PNG or JPEG)
    #[arg(long)]
    phase: PathBuf,

    /// Number of samples per curve
    #[arg(long, default_value_t = 1000)]
    samples: usize,

    /// Output JSON path (default: <magnitude stem>_bode.json next to input)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Serialize)]
struct CurveDto {
    source: usize,
    points: Vec<[f32; 2]>,
}

#[derive(Serialize)]
struct PlotDto {
    input: String,
    error: Option<String>,
    curves: Vec<CurveDto>,
}

#[derive(Serialize)]
struct BodeDto {
    elapsed_ms: f64,
    magnitude: PlotDto,
    phase: PlotDto,
}

fn plot_dto(input: &Path, result: &Result<Extraction, PipelineError>) -> PlotDto {
    match result {
        Ok(extraction) => PlotDto {
            input: input.display().to_string(),
            error: None,
            curves: extraction
                .curves()
                .iter()
                .map(|c| CurveDto {
                    source: c.source,
                    points: c.points.iter().map(|p| [p.x, p.y]).collect(),
                })
                .collect(),
        },
        Err(err) => PlotDto {
            input: input.display().to_string(),
            error: Some(err.to_string()),
            curves: Vec::new(),
        },
    }
}

fn summary(name: &str, result: &Result<Extraction, PipelineError>) {
    match result {
        Ok(extraction) => println!("  {name}: {} curve(s)", extraction.curves().len()),
        Err(err) if err.is_load_error() => println!("  {name}: could not read image ({err})"),
        Err(err) => println!("  {name}: failed ({err})"),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let out_path = args.out.clone().unwrap_or_else(|| {
        let stem = args.magnitude.file_stem().unwrap_or_default().to_string_lossy();
        let dir = args.magnitude.parent().unwrap_or(Path::new("."));
        dir.join(format!("{stem}_bode.json"))
    });

    let mut cfg = PipelineConfig::for_hint(GraphTypeHint::Bode);
    cfg.refine.resample_count = args.samples;

    let start = Instant::now();
    let pair = process_bode_pair(&args.magnitude, &args.phase, &cfg);
    let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;

    println!("processed pair in {elapsed_ms:.1} ms");
    summary("magnitude", &pair.magnitude);
    summary("phase", &pair.phase);

    let dto = BodeDto {
        elapsed_ms,
        magnitude: plot_dto(&args.magnitude, &pair.magnitude),
        phase: plot_dto(&args.phase, &pair.phase),
    };
    let bytes = serde_json::to_vec_pretty(&dto).context("serializing results")?;
    std::fs::write(&out_path, bytes).with_context(|| format!("writing {}", out_path.display()))?;
    println!("results written to {}", out_path.display());

    Ok(())
}
