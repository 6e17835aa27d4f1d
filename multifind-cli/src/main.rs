use anyhow::Context;
use clap::Parser;
use multifind::{search, LaunchPolicy, LineSink, SearchConfig};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Find files by name, one concurrent worker per name.
///
/// Every match is printed as "<worker>: <name>: <absolute path>".
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Search recursively
    #[arg(short = 'R', long)]
    recursive: bool,

    /// Ignore case (ASCII letters only)
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Descend into symlinked directories
    #[arg(short = 'L', long)]
    follow_links: bool,

    /// Stop launching workers after the first worker fails to start
    #[arg(long)]
    abort_on_launch_failure: bool,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error), overriding the config file; RUST_LOG takes precedence
    #[arg(long)]
    log_level: Option<String>,

    /// Directory to search in
    #[arg(value_name = "SEARCHPATH")]
    root: PathBuf,

    /// File names to look for
    #[arg(value_name = "FILE", required = true)]
    names: Vec<OsString>,
}

impl Cli {
    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            root_path: self.root.clone(),
            names: self.names.clone(),
            recursive: self.recursive,
            ignore_case: self.ignore_case,
            follow_links: self.follow_links,
            launch_policy: if self.abort_on_launch_failure {
                LaunchPolicy::Abort
            } else {
                LaunchPolicy::Continue
            },
            ..SearchConfig::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = SearchConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .merge_with_cli(cli.search_config());
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    setup_logging(&config.log_level);

    let sink = LineSink::stdout();
    let summary = search(&config, &sink)?;

    info!(
        workers = summary.workers_launched,
        matches = summary.total_matches,
        failed = summary.failed_workers,
        not_launched = summary.launch_failures,
        "Search finished"
    );
    Ok(())
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Matches go to stdout, so diagnostics must not
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
