use anyhow::Result;
use clap::Parser;
use image_conv::batch;
use image_conv::{BatchConfig, ConversionRequest, Format};
use std::path::PathBuf;
use std::process::ExitCode;

/// Convert images between JPEG, PNG, BMP and TIFF.
///
/// Files whose actual content does not match the source format are skipped.
#[derive(Debug, Parser)]
#[command(name = "image-conv", version, about)]
struct Cli {
    /// Directory to convert
    dir: PathBuf,

    /// Source format extension (jpg, jpeg, png, bmp, tif, tiff)
    #[arg(short, long, default_value = "jpg")]
    src: Format,

    /// Destination format extension (jpg, jpeg, png, bmp, tif, tiff)
    #[arg(short, long, default_value = "png")]
    dst: Format,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Number of worker threads (0 uses all cores)
    #[arg(short, long, default_value_t = 0)]
    jobs: usize,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // set RUST_LOG=debug to see skipped files
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = BatchConfig {
        root: cli.dir,
        recursive: cli.recursive,
        request: ConversionRequest::new(cli.src, cli.dst),
        jobs: cli.jobs,
    };
    let report = batch::run(&config)?;

    println!(
        "converted {}, skipped {}, failed {}",
        report.converted.len(),
        report.skipped.len(),
        report.failed.len()
    );

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
