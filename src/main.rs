use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use simlog_filter::cli::{Cli, init_config};
use simlog_filter::command::{CommandExecutor, parse_command};
use simlog_filter::config::Config;
use simlog_filter::display::ConsoleDisplay;
use simlog_filter::filter::FilterRegistry;
use simlog_filter::log::{InMemoryDataset, load_csv};
use simlog_filter::operations::Session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("simlog_filter=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = &cli.config;

    if cli.init {
        return init_config(config_path, cli.log.as_deref());
    }

    // A missing default config just means default layout
    let config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };
    config
        .validate()
        .with_context(|| format!("Invalid config {}", config_path))?;

    let log_path = resolve_log_path(&cli, &config)?;
    let records = load_csv(&log_path)?;

    let registry = FilterRegistry::new(config.filter_schema())?;
    let mut session = Session::new(registry, InMemoryDataset::new(records), ConsoleDisplay::new(cli.json));

    apply_startup_filters(&mut session, &config).await?;
    flush(&mut session)?;

    if !cli.exec.is_empty() {
        for line in &cli.exec {
            let quit = CommandExecutor::new(&mut session).execute(parse_command(line)).await?;
            flush(&mut session)?;
            if quit {
                break;
            }
        }
        return Ok(());
    }

    run_interactive(&mut session).await
}

/// --log wins; a relative path from the config file is taken relative to that file
fn resolve_log_path(cli: &Cli, config: &Config) -> anyhow::Result<PathBuf> {
    if let Some(path) = &cli.log {
        return Ok(path.clone());
    }
    let log_file = config
        .log_file
        .as_ref()
        .ok_or_else(|| anyhow!("No log file given. Pass --log <path> or set log_file in {}", cli.config))?;

    let base = config
        .config_path
        .as_deref()
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty());
    Ok(match base {
        Some(dir) if log_file.is_relative() => dir.join(log_file),
        _ => log_file.clone(),
    })
}

async fn apply_startup_filters(session: &mut Session, config: &Config) -> anyhow::Result<()> {
    for startup in &config.startup_filters {
        let (kind, inputs) = startup.inputs()?;
        for input in inputs {
            if let Err(e) = session.apply(kind, input).await {
                warn!(filter = %kind, error = %e, "startup filter rejected");
                session
                    .presenter_mut()
                    .set_status_error(format!("Startup filter {}: {}", kind, e));
            }
        }
    }
    Ok(())
}

async fn run_interactive(session: &mut Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let quit = CommandExecutor::new(session).execute(parse_command(&line)).await?;
        flush(session)?;
        if quit {
            break;
        }
    }
    Ok(())
}

fn flush(session: &mut Session) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    for line in session.presenter_mut().take_output() {
        writeln!(stdout, "{}", line)?;
    }
    Ok(())
}
