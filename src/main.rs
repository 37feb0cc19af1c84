//! Proofbox - sequent prover execution service.
//!
//! Usage:
//!   proofbox serve [--port 8080]                  # Start HTTP server
//!   proofbox prove --sequent 'A |- A' [--format bussproofs]

use std::path::PathBuf;
use std::process::exit;

use clap::{Args as ClapArgs, Parser, Subcommand};

use proofbox::config::{validate_timeout, ServiceConfig, DEFAULT_TIMEOUT_SECS};
use proofbox::harvest::RenderFormat;
use proofbox::pipeline::{Pipeline, ProveRequest};
use proofbox::state::AppState;
use proofbox::{http_server, Verdict};

#[derive(Parser, Debug)]
#[command(name = "proofbox")]
#[command(about = "Bounded sequent-prover execution service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Prove a single sequent and print the result record as JSON
    Prove {
        /// Sequent text to prove
        #[arg(long)]
        sequent: String,

        /// Rendering format to request (repeatable)
        #[arg(long = "format")]
        formats: Vec<RenderFormat>,

        /// Wall-clock timeout in seconds (1-10)
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct ConfigArgs {
    /// Path to the prover executable
    #[arg(long, default_value = "sequent-prover")]
    prover: PathBuf,

    /// Directory under which per-request workspaces are created
    #[arg(long)]
    workspace_root: Option<PathBuf>,

    /// Memory ceiling for the prover process in MB
    #[arg(long, default_value_t = 500)]
    mem_mb: u64,

    /// Output-size ceiling passed to the prover in KB
    #[arg(long, default_value_t = 512)]
    max_output_kb: u64,
}

impl ConfigArgs {
    fn into_config(self) -> ServiceConfig {
        let defaults = ServiceConfig::default();
        ServiceConfig {
            prover_path: self.prover,
            workspace_root: self.workspace_root.unwrap_or(defaults.workspace_root),
            memory_limit_mb: self.mem_mb,
            output_limit_kb: self.max_output_kb,
            capture_limit_bytes: defaults.capture_limit_bytes,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, config } => {
            let state = AppState::new(config.into_config());
            http_server::run_server(port, state).await;
        }
        Commands::Prove {
            sequent,
            formats,
            timeout,
            config,
        } => {
            let timeout = match validate_timeout(timeout) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(2);
                }
            };
            let request = ProveRequest {
                sequent,
                formats: formats.into_iter().collect(),
                timeout,
            };
            let pipeline = Pipeline::new(config.into_config());
            match pipeline.execute(&request).await {
                Ok(record) => {
                    println!("{}", serde_json::to_string_pretty(&record).unwrap());
                    exit(if record.verdict == Verdict::Success { 0 } else { 1 });
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    exit(1);
                }
            }
        }
    }
}
