//! APEX command-line interface

use anyhow::Result;
use apex::cli::{check, logging, output, repl, run};
use apex_core::TextEncoding;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rule-based classification of clinical notes
#[derive(Parser)]
#[command(name = "apex")]
#[command(author, version, about = "Rule-based clinical note classification", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, table, pretty)
    #[arg(short = 'f', long, global = true)]
    format: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch described by a JSON configuration file
    Run {
        /// Configuration file
        config: PathBuf,
    },

    /// Classify a single note
    Check {
        /// Note text
        #[arg(short, long, conflicts_with = "input")]
        text: Option<String>,

        /// Note file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Algorithms to run (default: all)
        #[arg(short, long = "algorithm")]
        algorithms: Vec<String>,

        /// Encoding of the note file
        #[arg(short, long, default_value = "utf8")]
        encoding: TextEncoding,
    },

    /// List the available algorithms
    List,

    /// Start interactive REPL
    Repl {
        /// Algorithms to run (default: all)
        #[arg(short, long = "algorithm")]
        algorithms: Vec<String>,
    },
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    output::setup_colors(&cli.color);

    if let Err(e) = dispatch(cli) {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { config } => {
            let config = run::load(&config)?;
            logging::init(cli.verbose || config.logger.verbose);
            run::execute(run::RunCommandConfig {
                config,
                output_format: cli.format,
                output_file: cli.output,
            })
        }

        Commands::Check {
            text,
            input,
            algorithms,
            encoding,
        } => {
            logging::init(cli.verbose);
            check::check(check::CheckConfig {
                text,
                input,
                algorithms,
                encoding,
                output_format: cli.format,
                output_file: cli.output,
            })
        }

        Commands::List => {
            logging::init(cli.verbose);
            check::list(cli.format.as_deref())
        }

        Commands::Repl { algorithms } => {
            logging::init(cli.verbose);
            repl::run(repl::ReplConfig {
                algorithms,
                output_format: cli.format,
            })
        }
    }
}
