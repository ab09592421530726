/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Interactive log viewer, stdout log dump, or raw log download
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands, or startup flow
*/

mod tui;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use tasklog_viewer::{
    LoadOutcome, LogFilter, MergeKind, SessionKey, SkipReason, TaskLogStore, ViewerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "tasklog-viewer", version, about = "Page through job task logs")]
struct Cli {
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    log_level: String,
    /// Overrides `base_url` from the config file
    #[arg(long = "base-url", value_name = "URL", global = true)]
    base_url: Option<String>,
    /// Overrides `project_id` from the config file
    #[arg(long = "project-id", value_name = "ID", global = true)]
    project_id: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct TaskArgs {
    #[arg(long = "job", value_name = "JOB_ID")]
    job_id: String,
    #[arg(long = "task", value_name = "TASK_ID")]
    task_id: String,
    #[arg(long = "file", value_name = "PATH")]
    file_path: String,
}

impl TaskArgs {
    fn session(&self) -> SessionKey {
        SessionKey::new(&self.job_id, &self.task_id, &self.file_path)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive log viewer
    View(TaskArgs),
    /// Print the most recent lines, optionally walking further back
    Dump {
        #[command(flatten)]
        task: TaskArgs,
        /// Older pages to fetch after the initial window
        #[arg(long, default_value_t = 0)]
        pages: u32,
        #[arg(long = "errors-only")]
        errors_only: bool,
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,
    },
    /// Save the raw log file
    Download {
        #[command(flatten)]
        task: TaskArgs,
        #[arg(long = "out", value_name = "PATH")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let config = load_config(&args)?;
    let interactive = matches!(args.command, Command::View(_));
    let _guard = init_tracing(&args.log_level, interactive.then(|| config.log_dir()).as_deref())?;

    info!(
        base_url = %config.base_url,
        project_id = %config.project_id,
        "starting tasklog-viewer"
    );

    if interactive {
        return run(args.command, config).await;
    }

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());
    tokio::select! {
        result = run(args.command, config) => result,
        _ = shutdown.cancelled() => {
            warn!("interrupted");
            Ok(())
        }
    }
}

async fn run(command: Command, config: ViewerConfig) -> Result<()> {
    match command {
        Command::View(task) => {
            let store = Arc::new(build_store(&config)?);
            tui::run_tui(store, task.session(), &config.viewport).await
        }
        Command::Dump {
            task,
            pages,
            errors_only,
            search,
        } => {
            let filter = LogFilter::new(search.unwrap_or_default(), errors_only);
            dump(&config, task.session(), pages, &filter).await
        }
        Command::Download { task, out } => download(&config, &task, &out).await,
    }
}

fn init_tracing(log_level: &str, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;

    // The TUI owns the terminal, so its logs go to a file.
    if let Some(log_dir) = log_dir {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("create log dir {}", log_dir.display()))?;
        let file_appender = tracing_appender::rolling::daily(log_dir, "tasklog-viewer.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(non_blocking)
            .with_ansi(false)
            .try_init()
            .map_err(|err| anyhow!(err))
            .context("initialize tracing subscriber")?;
        return Ok(Some(guard));
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(None)
}

fn load_config(args: &Cli) -> Result<ViewerConfig> {
    let mut config = ViewerConfig::load(args.config_path.as_deref()).context("load config")?;
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(project_id) = &args.project_id {
        config.project_id = project_id.clone();
    }
    config.validate().context("validate config")?;
    Ok(config)
}

fn build_store(config: &ViewerConfig) -> Result<TaskLogStore<tasklog_adapter::TasklogClient>> {
    let client = config.build_client().context("create HTTP client")?;
    Ok(TaskLogStore::new(
        client,
        config.project_id.clone(),
        config.store.clone(),
    ))
}

async fn dump(
    config: &ViewerConfig,
    session: SessionKey,
    pages: u32,
    filter: &LogFilter,
) -> Result<()> {
    let store = build_store(config)?;
    store
        .load_initial(session)
        .await
        .context("load most recent log window")?;

    for page in 0..pages {
        match store.load_older().await.context("load older page")? {
            LoadOutcome::Applied(MergeKind::Replaced(reset)) => {
                warn!(
                    page,
                    discarded = reset.discarded,
                    "memory limit reached; printing the oldest window only"
                );
                break;
            }
            LoadOutcome::Applied(_) => {}
            LoadOutcome::Skipped(SkipReason::Exhausted) => break,
            outcome => {
                warn!(?outcome, "older page not applied");
                break;
            }
        }
    }

    let snapshot = store.snapshot();
    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    let mut printed = 0usize;
    for entry in snapshot.entries.iter().filter(|entry| filter.matches(entry)) {
        writeln!(out, "{entry}").context("write to stdout")?;
        printed += 1;
    }
    out.flush().context("flush stdout")?;

    info!(
        printed,
        buffered = snapshot.entries.len(),
        has_more_older = snapshot.pagination.has_more_older,
        "dump complete"
    );
    Ok(())
}

async fn download(config: &ViewerConfig, task: &TaskArgs, out: &Path) -> Result<()> {
    let client = config.build_client().context("create HTTP client")?;
    let project_id = config.project_id.as_str();

    let probe = client
        .probe_log_download(project_id, &task.job_id, &task.task_id, &task.file_path)
        .await
        .context("probe log file")?;
    info!(
        total_bytes = ?probe.total_bytes,
        supports_ranges = probe.supports_ranges,
        "log file probed"
    );

    let mut file = tokio::fs::File::create(out)
        .await
        .with_context(|| format!("create {}", out.display()))?;
    let written = client
        .download_task_logs(
            project_id,
            &task.job_id,
            &task.task_id,
            &task.file_path,
            &mut file,
        )
        .await
        .context("download log file")?;
    file.sync_all().await.context("sync output file")?;
    file.shutdown().await.context("close output file")?;

    if let Some(total) = probe.total_bytes {
        if total != written {
            warn!(total, written, "downloaded size differs from probed size");
        }
    }
    println!("{written} bytes written to {}", out.display());
    Ok(())
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
