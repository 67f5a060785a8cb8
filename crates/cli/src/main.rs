use anyhow::Result;
use clap::{Parser, Subcommand};
use gene_report::commands::{hash_command, inventory_command, report_command, ReportOptions};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

/// Gene report retrieval and correlation CLI.
///
/// This CLI is a thin wrapper around `gene-core` (exposed in code as
/// `gene_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "gene-report",
    version,
    about = "Retrieves cloud-computed gene intelligence and correlates it onto local functions",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, correlate, and export the gene report for a binary.
    ///
    /// This will:
    /// - Hash the binary to obtain its cloud identifier.
    /// - Submit the local function inventory and poll the report job.
    /// - Correlate the report onto local addresses and write the artifact.
    Report {
        /// Path to the binary the report is for.
        #[arg(long)]
        binary: String,

        /// Path to the function inventory exported by the disassembly host
        /// (JSON array of {start, end, name}).
        #[arg(long)]
        inventory: String,

        /// Image base of the local disassembly session (decimal or 0x hex).
        #[arg(long)]
        image_base: String,

        /// API key. Defaults to the GENE_API_KEY environment variable.
        #[arg(long)]
        api_key: Option<String>,

        /// Service base URL. Defaults to GENE_BASE_URL or the production endpoint.
        #[arg(long)]
        base_url: Option<String>,

        /// Export destination. Defaults to GENE_EXPORT_PATH or ./genes.json.
        #[arg(long)]
        output: Option<String>,
    },

    /// Validate and summarize a function inventory file (no network use).
    Inventory {
        /// Path to the inventory JSON file.
        #[arg(long)]
        path: String,
    },

    /// Print the SHA-256 the cloud service identifies a binary by.
    Hash {
        /// Path to the binary to hash.
        #[arg(long)]
        path: String,
    },
}

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            // Full context chain; the run must end cleanly, never panic.
            eprintln!("error: {e:#}");
            exit_code_for(&e)
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.to_string().contains("GENE_API_KEY") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Report { binary, inventory, image_base, api_key, base_url, output } => {
            report_command(
                &binary,
                &inventory,
                &image_base,
                ReportOptions { api_key, base_url, output },
            )
        }
        Command::Inventory { path } => inventory_command(&path),
        Command::Hash { path } => hash_command(&path),
    }
}
