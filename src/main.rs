use std::{io::stderr, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ascmerge::config::FormatSpec;

/// Merge rotated Vector ASC CAN-bus logs into one continuous log.
///
/// Input files are taken in lexicographic filename order. The first file's
/// header is kept through its "base hex" marker line; every data line's
/// leading timestamp is shifted by the last timestamp of the files merged
/// before it, preserving the token's decimal precision and column width.
#[derive(Parser)]
#[command(version, about, long_about, disable_help_subcommand = true)]
struct Cli {
    /// Logging level filters, e.g., debug, info, warn, etc ...
    #[arg(short, long, default_value = "info")]
    logging: String,

    /// Directory containing the rotated log files.
    #[arg(value_name = "dir")]
    input_dir: PathBuf,

    /// Output file; relative paths resolve against the input directory.
    ///
    /// Defaults to merged.<extension> inside the input directory. The output
    /// file is never picked up as an input, even when its name matches the
    /// input pattern.
    #[arg(short, long, value_name = "path")]
    output: Option<PathBuf>,

    #[command(flatten)]
    format: FormatArgs,
}

#[derive(Args)]
struct FormatArgs {
    /// YAML format spec to use, rather than the built-in ASC conventions.
    #[arg(short, long, value_name = "path", conflicts_with_all = ["extension", "marker"])]
    config: Option<PathBuf>,

    /// Input file extension to match, without the dot.
    #[arg(short, long, value_name = "ext")]
    extension: Option<String>,

    /// Header-end marker, matched case-insensitively at line start.
    #[arg(short, long, value_name = "text")]
    marker: Option<String>,
}

fn get_spec(args: FormatArgs) -> Result<FormatSpec> {
    match args.config {
        Some(fpath) => FormatSpec::with_path(&fpath).context("Invalid format spec"),
        None => {
            let mut spec = FormatSpec::default();
            if let Some(extension) = args.extension {
                spec.extension = extension;
            }
            if let Some(marker) = args.marker {
                spec.marker = marker;
            }
            Ok(spec.validate()?)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(EnvFilter::new(cli.logging))
        .init();

    let spec = get_spec(cli.format)?;
    let output = match cli.output {
        Some(fpath) if fpath.is_absolute() => fpath,
        Some(fpath) => cli.input_dir.join(fpath),
        None => cli.input_dir.join(format!("merged.{}", spec.extension)),
    };

    let summary = ascmerge::merge(&cli.input_dir, &output, spec)?;
    info!(
        "merged {} records from {} files into {output:?}",
        summary.records, summary.files
    );

    Ok(())
}
