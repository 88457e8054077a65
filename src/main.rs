//! emersyx host - main entry point.
//!
//! Initializes logging, loads the configuration, assembles every component
//! and hands control to the router. Any fatal error exits with status 1.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use emersyx_core::assembly::{Assembly, AssemblyContext};
use emersyx_core::observability::{init_logging, LogOptions};
use emersyx_core::registry::ModuleRegistry;
use emersyx_core::{Config, Result};

#[derive(Parser, Debug)]
#[command(name = "emersyx", version, about = "Modular message routing host")]
struct Cli {
    /// Write log records to standard output.
    #[arg(long)]
    logstdout: bool,

    /// Append log records to this file.
    #[arg(long, value_name = "PATH")]
    logfile: Option<PathBuf>,

    /// Verbosity: 0 = error, 1 = warn, 2 = info, 3 = debug, 4 = trace.
    #[arg(long, default_value_t = 0)]
    loglevel: u8,

    /// Path to the TOML configuration file.
    #[arg(long, env = "EMERSYX_CONFIG", value_name = "PATH")]
    conffile: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let options = LogOptions {
        stdout: cli.logstdout,
        file: cli.logfile.clone(),
        level: cli.loglevel,
    };
    let sink = match init_logging(&options) {
        Ok(sink) => sink,
        Err(err) => {
            eprintln!("error occurred while initializing the logger: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut ctx = AssemblyContext::new(ModuleRegistry::new(), sink);
    match run(&mut ctx, &cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Fatal error");
            tracing::error!("{}", err.summary());
            ExitCode::FAILURE
        }
    }
}

async fn run(ctx: &mut AssemblyContext, cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.conffile)?;
    tracing::info!(path = %cli.conffile.display(), "Loaded configuration");

    let assembly = Assembly::assemble(ctx, &config)?;
    assembly.start().await
}
