mod cmd;
mod output;
mod prompt;
mod root;
mod status;

use armflow_core::config::PLAN_FILE;
use clap::{Parser, Subcommand};
use cmd::run::{RunOptions, RunSubcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "armflow",
    about = "Run robot action plans step by step and decode TM status frames",
    version,
    propagate_version = true
)]
struct Cli {
    /// Plan file (default: nearest armflow.yaml in this directory or above)
    #[arg(long, global = true, env = "ARMFLOW_PLAN")]
    plan: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the plan's actions
    List,

    /// Validate the plan for common mistakes
    Check,

    /// Run plan actions, asking before each one
    Run {
        /// Run without asking for confirmation
        #[arg(long, short = 'y', global = true)]
        yes: bool,

        /// Do not move the selection to the next action afterwards
        #[arg(long, global = true)]
        no_advance: bool,

        #[command(subcommand)]
        subcommand: RunSubcommand,
    },

    /// Decode $TMSTA position frames from a capture file or stdin
    Decode {
        /// Capture file (default: stdin)
        file: Option<PathBuf>,
    },

    /// Ask a connected arm for its current position
    Position {
        /// Controller address, e.g. 192.168.1.10:5890
        addr: String,

        /// How long to wait for the connection and for the reply
        #[arg(long, default_value = "1000")]
        timeout_ms: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Run { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let plan = root::resolve_plan(cli.plan.as_deref());

    let result = match cli.command {
        Commands::List => require_plan(plan).and_then(|p| cmd::list::run(&p, cli.json)),
        Commands::Check => require_plan(plan).and_then(|p| cmd::check::run(&p, cli.json)),
        Commands::Run {
            yes,
            no_advance,
            subcommand,
        } => require_plan(plan).and_then(|p| {
            let opts = RunOptions {
                yes,
                no_advance,
                json: cli.json,
            };
            cmd::run::run(&p, subcommand, opts)
        }),
        Commands::Decode { file } => cmd::decode::run(plan.as_deref(), file.as_deref(), cli.json),
        Commands::Position { addr, timeout_ms } => cmd::position::run(
            plan.as_deref(),
            &addr,
            Duration::from_millis(timeout_ms),
            cli.json,
        ),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn require_plan(plan: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    plan.ok_or_else(|| {
        anyhow::anyhow!("no {PLAN_FILE} found in this directory or any parent (use --plan)")
    })
}
