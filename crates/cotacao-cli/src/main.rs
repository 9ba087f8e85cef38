mod commands;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cotacao",
    version,
    about = "Reference prices from public procurement price research reports"
)]
struct Cli {
    /// Log parsing decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a price research report into quote rows (without aggregating)
    Parse {
        /// Path to PDF, or to text extracted with `pdftotext -layout` (.txt)
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// JSON file selecting which quotes compose each price
        #[arg(long, value_name = "FILE")]
        payload: Option<PathBuf>,
    },
    /// Compute the reference price of every item in a report
    Aggregate {
        /// Path to PDF or extracted text (.txt)
        input_file: PathBuf,

        /// Predefined policy: mean-of-others (default), median-band, iqr
        #[arg(short, long, value_name = "NAME")]
        policy: Option<String>,

        /// Custom JSON policy file (overrides --policy)
        #[arg(long, value_name = "FILE")]
        policy_file: Option<PathBuf>,

        /// JSON file selecting which quotes compose each price
        #[arg(long, value_name = "FILE")]
        payload: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the full result to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Print the calculation record of each item
        #[arg(long)]
        audit: bool,
    },
    /// Print the numbered lines of the first pages
    Dump {
        /// Path to PDF or extracted text (.txt)
        input_file: PathBuf,

        #[arg(long, default_value_t = 3)]
        pages: usize,

        #[arg(long, default_value_t = 100)]
        max_lines: usize,
    },
    /// Manage and inspect outlier policies
    Policies {
        #[command(subcommand)]
        action: PoliciesAction,
    },
}

#[derive(Subcommand)]
enum PoliciesAction {
    /// List predefined policies
    List,
    /// Explain a policy in plain language
    Explain {
        /// Preset name (e.g., "mean-of-others")
        preset: String,
    },
    /// Print the JSON schema with field descriptions and example
    Schema,
    /// Validate a custom policy file
    Validate {
        /// Path to JSON policy file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            input_file,
            output,
            out,
            payload,
        } => commands::parse::run(input_file, &output, out, payload),
        Commands::Aggregate {
            input_file,
            policy,
            policy_file,
            payload,
            output,
            out,
            audit,
        } => commands::aggregate::run(commands::aggregate::AggregateArgs {
            input_file,
            preset: policy,
            policy_file,
            payload,
            output_format: output,
            out,
            audit,
        }),
        Commands::Dump {
            input_file,
            pages,
            max_lines,
        } => commands::dump::run(input_file, pages, max_lines),
        Commands::Policies { action } => match action {
            PoliciesAction::List => commands::policies::list(),
            PoliciesAction::Explain { preset } => commands::policies::explain(&preset),
            PoliciesAction::Schema => commands::policies::schema(),
            PoliciesAction::Validate { file } => commands::policies::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
