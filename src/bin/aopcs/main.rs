mod convert;
mod frames;

use std::io::stderr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use aopcs::report::{Projector, Whitelist};
use aopcs::tables::Tables;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Satellites the embedded pass predictor can handle.
const DEFAULT_WHITELIST: &str = "1A,1B,1E,3A,3B,3D,5A,5C,5E";

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a raw Allcast binary into an AOP report and its metadata document.
    Convert {
        /// Only include these satellite names in the report.
        #[arg(
            short,
            long,
            env = "AOPCS_SATELLITE_WHITELIST",
            default_value = DEFAULT_WHITELIST,
            value_name = "csv"
        )]
        whitelist: String,

        /// Include all identified satellites, ignoring --whitelist.
        #[arg(long, action)]
        no_whitelist: bool,

        /// JSON identification and status tables overlaid on the built-in tables.
        #[arg(short, long, value_name = "path")]
        tables: Option<PathBuf>,

        /// File name recorded in the metadata document.
        #[arg(long, default_value = "aop")]
        file_name: String,

        /// Delete output files if they already exist
        #[arg(long, action)]
        clobber: bool,

        /// Report output path.
        #[arg(short, long, default_value = "aop", value_name = "path")]
        output: PathBuf,

        /// Metadata document output path.
        #[arg(short, long, default_value = "metadata.json", value_name = "path")]
        metadata: PathBuf,

        /// Input Allcast binary.
        input: PathBuf,
    },
    /// Show the decoded frames of a raw Allcast binary.
    Frames {
        /// Input Allcast binary.
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: frames::Format,
    },
    /// Show the effective identification and status tables as JSON.
    Tables {
        /// JSON tables overlaid on the built-in tables.
        #[arg(short, long, value_name = "path")]
        tables: Option<PathBuf>,
    },
}

fn load_tables(path: Option<&PathBuf>) -> Result<Tables> {
    match path {
        Some(path) => {
            Tables::with_file(path, true).with_context(|| format!("loading tables from {path:?}"))
        }
        None => Ok(Tables::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("AOPCS_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Convert {
            whitelist,
            no_whitelist,
            tables,
            file_name,
            clobber,
            output,
            metadata,
            input,
        } => {
            for path in [output, metadata] {
                if !clobber && path.exists() {
                    bail!("{path:?} exists; use --clobber");
                }
            }
            let whitelist = if *no_whitelist {
                Whitelist::default()
            } else {
                Whitelist::parse(whitelist)
            };
            debug!("whitelist: {:?}", whitelist);
            let projector = Projector::builder()
                .tables(load_tables(tables.as_ref())?)
                .whitelist(whitelist)
                .build();
            convert::convert(input, output, metadata, &projector, file_name)
        }
        Commands::Frames { input, format } => frames::frames(input, format),
        Commands::Tables { tables } => {
            let tables = load_tables(tables.as_ref())?;
            serde_json::to_writer_pretty(std::io::stdout(), &tables).context("serializing tables")
        }
    }
}
