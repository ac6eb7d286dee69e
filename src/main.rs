//! wfn-compare CLI - consistency checks for WFN files and their text dumps

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use wfn_compare::{pipeline, CompareConfig, VERSION};

/// wfn-compare - compare wavefunction files against each other and against text dumps
#[derive(Parser, Debug)]
#[command(name = "wfn-compare")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML file with comparison settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare two WFN files and their reference slices (default)
    Compare {
        /// First WFN file [default: WFNq.h5]
        #[arg(long)]
        orig: Option<PathBuf>,

        /// Second WFN file [default: WFN_new.h5]
        #[arg(long)]
        new: Option<PathBuf>,

        /// Directory with the reference text slices [default: .]
        #[arg(short, long)]
        reference_dir: Option<PathBuf>,

        /// Skip the per-k-point/per-band comparison
        #[arg(long)]
        global_only: bool,
    },

    /// Write header.dat and per-slice text files from a WFN file
    Dump {
        /// WFN file to dump [default: WFNq.h5]
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory [default: reference directory from config]
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Build a WFN file from header.dat and per-slice text files
    Assemble {
        /// Directory with header.dat and the text files [default: reference directory from config]
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// WFN file to create [default: new file from config, WFN_new.h5]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

/// A file given on the command line, else the one from the config
fn or_config(arg: Option<PathBuf>, configured: &Path) -> PathBuf {
    arg.unwrap_or_else(|| configured.to_path_buf())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    info!("wfn-compare v{}", VERSION);

    let mut config = match &cli.config {
        Some(path) => CompareConfig::load(path)?,
        None => CompareConfig::default(),
    };

    let command = cli.command.unwrap_or(Commands::Compare {
        orig: None,
        new: None,
        reference_dir: None,
        global_only: false,
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Compare {
            orig,
            new,
            reference_dir,
            global_only,
        } => {
            if let Some(orig) = orig {
                config.orig = orig;
            }
            if let Some(new) = new {
                config.new = new;
            }
            if let Some(dir) = reference_dir {
                config.reference.dir = dir;
            }
            if global_only {
                config.per_slice = false;
            }

            info!("Comparing {:?} with {:?}", config.orig, config.new);
            pipeline::compare(&config, &mut out)?;
        }

        Commands::Dump { input, output_dir } => {
            let input = or_config(input, &config.orig);
            if let Some(dir) = output_dir {
                config.reference.dir = dir;
            }

            info!("Dumping {:?} to {:?}", input, config.reference.dir);
            let summary = pipeline::dump(&input, &config.reference, &mut out)?;
            info!("{} files written", summary.files_written);
        }

        Commands::Assemble { input_dir, output } => {
            let output = or_config(output, &config.new);
            if let Some(dir) = input_dir {
                config.reference.dir = dir;
            }

            info!("Assembling {:?} from {:?}", output, config.reference.dir);
            let header = pipeline::assemble(&config.reference, &output)?;
            info!("{} k-points, {} bands", header.nrk, header.mnband);
        }
    }

    out.flush()?;
    Ok(())
}
