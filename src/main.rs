use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stpd::index::{self, ArrayKind, BuildInputs, IndexConfig, PhiBackend, SamplingKind, StpdIndex};
use stpd::text::OracleKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stpd")]
#[command(about = "Compressed full-text index for DNA based on suffix tree path decomposition")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index from a text and its prefix array files
    Build {
        /// Text file; `.pa`, `.rbwt` and the sample file sit next to it
        base: PathBuf,

        /// Index file to write
        #[arg(short, long)]
        output: PathBuf,

        /// JSON configuration; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Phi structure
        #[arg(long, value_enum)]
        phi: Option<PhiBackend>,

        /// Text representation
        #[arg(long, value_enum)]
        oracle: Option<OracleKind>,

        /// Reference length for the RLZ oracle
        #[arg(long)]
        rlz_reference: Option<usize>,

        /// Sample search strategy
        #[arg(long, value_enum)]
        array: Option<ArrayKind>,

        /// Window length for the dictionary search
        #[arg(long)]
        window: Option<usize>,

        /// Sample file to read
        #[arg(long, value_enum)]
        sampling: Option<SamplingKind>,
    },
    /// Locate every pattern of a FASTA file, writing `<patterns>.occs`
    Locate {
        /// Index file
        index: PathBuf,

        /// FASTA file of patterns
        patterns: PathBuf,

        /// Stop after this many occurrences per pattern
        #[arg(long)]
        max_occs: Option<usize>,
    },
    /// Show index statistics
    Stats {
        /// Index file
        index: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stpd=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            base,
            output,
            config,
            phi,
            oracle,
            rlz_reference,
            array,
            window,
            sampling,
        } => {
            let mut config = match config {
                Some(path) => IndexConfig::load(&path)?,
                None => IndexConfig::default(),
            };
            if let Some(phi) = phi {
                config.phi = phi;
            }
            if let Some(oracle) = oracle {
                config.oracle = oracle;
            }
            if rlz_reference.is_some() {
                config.rlz_reference_len = rlz_reference;
            }
            if let Some(array) = array {
                config.array = array;
            }
            if let Some(window) = window {
                config.window_len = window;
            }
            if let Some(sampling) = sampling {
                config.sampling = sampling;
            }

            let inputs = BuildInputs::from_base(&base, config.sampling);
            let index = StpdIndex::build(&inputs, &config)?;
            let meta = index.store(&output)?;
            println!(
                "Indexed {} symbols: {} samples, {} runs, {}",
                meta.text_len,
                meta.sample_count,
                meta.run_count,
                index::stats::format_space(meta.total_bytes, meta.text_len as usize)
            );
        }
        Commands::Locate {
            index: index_path,
            patterns,
            max_occs,
        } => {
            let index = StpdIndex::load(&index_path)?;
            let summary = index::locate_fasta(&index, &patterns, max_occs)?;
            println!("{}", summary);
            println!("Output:               {}", summary.output.display());
        }
        Commands::Stats { index: index_path } => {
            index::stats::show_stats(&index_path)?;
        }
    }

    Ok(())
}
