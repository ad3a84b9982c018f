mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use sendchange_core::{BatchReport, HookRunner, NotifierConfig, VcsKind};
use sendchange_logging::{init_tracing, LogFormat};
use sendchange_notify::create_notifier;
use sendchange_vcs::create_backend;

use crate::config::FileConfig;

/// Exit status for errors that abort the whole run
const EXIT_FATAL: i32 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "sendchange",
    about = "Notify a buildbot master about pushed commits",
    long_about = "Reads '<oldrev> <newrev> <refname>' lines on stdin like any git \
                  post-receive hook and runs 'buildbot sendchange' for every new \
                  revision on the tracked branch.",
    version
)]
struct Cli {
    /// Config file (default: sendchange.toml in the repository, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Version control system
    #[arg(long, value_enum)]
    vcs: Option<VcsChoice>,

    /// Repository path (default: $GIT_DIR, then the current directory)
    #[arg(short = 'd', long)]
    repo_path: Option<PathBuf>,

    /// Buildbot master address (host:port)
    #[arg(short, long)]
    master: Option<String>,

    /// Repository identifier reported to the master
    #[arg(long)]
    repository: Option<String>,

    /// Tracked ref (e.g. refs/heads/master)
    #[arg(short, long)]
    branch: Option<String>,

    /// Path to the buildbot binary
    #[arg(long)]
    notifier: Option<PathBuf>,

    /// Process these revisions instead of reading hook input (e.g. from an SVN post-commit hook)
    #[arg(short = 'r', long = "revision", value_name = "REV")]
    revisions: Vec<String>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormatChoice>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json_output: bool,

    /// Dry run: log the sendchange command lines without running them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VcsChoice {
    Git,
    Svn,
}

impl From<VcsChoice> for VcsKind {
    fn from(choice: VcsChoice) -> Self {
        match choice {
            VcsChoice::Git => VcsKind::Git,
            VcsChoice::Svn => VcsKind::Svn,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("sendchange: {:#}", e);
            EXIT_FATAL
        }
    };

    std::process::exit(code);
}

/// Everything up to the exit code. The log guard lives in here so the log
/// file is flushed before the process exits.
async fn run(cli: Cli) -> Result<i32> {
    let (config, file) = resolve_config(&cli)?;

    let log_format: LogFormat = cli
        .log_format
        .map(Into::into)
        .or(file.log_format)
        .unwrap_or_default();
    let log_dir = cli.log_dir.clone().or_else(|| file.log_dir.clone());
    let _log_guard = init_tracing(&cli.log_level, log_format, log_dir.as_deref())
        .context("Failed to initialize logging")?;

    info!(
        vcs = %config.vcs,
        repo = %config.repo_path.display(),
        master = %config.master,
        branch = %config.branch,
        dry_run = cli.dry_run,
        "Starting sendchange"
    );

    let backend = create_backend(&config);
    let notifier = create_notifier(&config, cli.dry_run);
    let runner = HookRunner::new(backend.as_ref(), notifier.as_ref(), &config);

    let report = if cli.revisions.is_empty() {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        runner.run(stdin).await?
    } else {
        runner.run_revisions(&cli.revisions).await
    };

    if cli.json_output {
        let json = serde_json::to_string_pretty(&report)?;
        println!("{}", json);
    } else {
        print_failures(&report);
    }

    Ok(report.exit_code())
}

/// Defaults, then the config file, then command line flags
fn resolve_config(cli: &Cli) -> Result<(NotifierConfig, FileConfig)> {
    let repo_dir = cli
        .repo_path
        .clone()
        .or_else(|| std::env::var_os("GIT_DIR").map(PathBuf::from))
        .map_or_else(std::env::current_dir, Ok)
        .context("Failed to get current directory")?;

    let file = match cli.config {
        Some(ref path) => FileConfig::load(path)?,
        None => FileConfig::discover(&repo_dir)?.unwrap_or_default(),
    };

    let mut config = NotifierConfig::new(VcsKind::Git, repo_dir);
    file.apply(&mut config);

    if let Some(vcs) = cli.vcs {
        config.vcs = vcs.into();
    }
    if let Some(ref path) = cli.repo_path {
        config.repo_path = path.clone();
    }
    if let Some(ref master) = cli.master {
        config.master = master.clone();
    }
    if let Some(ref repository) = cli.repository {
        config.repository = repository.clone();
    }
    if let Some(ref branch) = cli.branch {
        config.branch = branch.clone();
    }
    if let Some(ref notifier) = cli.notifier {
        config.notifier = notifier.clone();
    }

    Ok((config, file))
}

fn print_failures(report: &BatchReport) {
    for failure in &report.failures {
        match failure.revision {
            Some(ref revision) => {
                eprintln!("sendchange: revision {} not sent: {}", revision, failure.error)
            }
            None => eprintln!(
                "sendchange: update of {} not processed: {}",
                failure.ref_name, failure.error
            ),
        }
    }
}
