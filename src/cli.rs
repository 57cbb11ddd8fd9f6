//! CLI argument parsing and execution

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use sync_replaces::sync::{self, SyncOptions};
use sync_replaces::toolchain::GoCommand;

/// Sync replace directives from direct dependencies into go.mod
#[derive(Parser, Debug)]
#[command(name = "sync-replaces")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show per-dependency progress and skipped dependencies
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not run `go mod tidy` after syncing
    #[arg(long)]
    pub skip_tidy: bool,

    /// Module directory containing go.mod (defaults to current directory)
    #[arg(long, value_name = "PATH", env = "SYNC_REPLACES_DIR")]
    pub dir: Option<PathBuf>,

    /// Go binary to run
    #[arg(long, value_name = "PATH", env = "SYNC_REPLACES_GO", default_value = "go")]
    pub go: PathBuf,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Execute the sync
    pub fn execute(self) -> Result<()> {
        self.init_logging();

        let options = SyncOptions {
            dir: self.dir,
            dry_run: self.dry_run,
            verbose: self.verbose,
            skip_tidy: self.skip_tidy,
        };
        let toolchain = GoCommand::new(self.go);

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let outcome = sync::run(&options, &toolchain, &mut out)?;
        out.flush()?;
        log::debug!("sync finished: {:?}", outcome);
        Ok(())
    }

    /// Initialise `env_logger`. `RUST_LOG` wins over `--log-level`, which
    /// wins over the default implied by `--verbose`.
    fn init_logging(&self) {
        let default_level = match &self.log_level {
            Some(level) => level.as_str(),
            None if self.verbose => "debug",
            None => "warn",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp(None)
            .init();
    }
}
