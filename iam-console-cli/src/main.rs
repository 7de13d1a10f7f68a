//! Command-line entry point for the IAM administration console
//!
//! Runs one console action per invocation against the configured backend, or
//! against built-in sample data with `--offline`. Results go to stdout; logs and
//! console notifications go to stderr.
//!
//! Offline sample data is rebuilt for every invocation, so changes made with
//! `--offline` are not kept.

mod backend;
mod cli;
mod commands;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use iam_console_core::{ConsoleConfig, ConsoleError, NotificationLevel, RecordingNotifier};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use backend::Backend;
use cli::Cli;
use commands::Context;

#[tokio::main]
async fn main() -> ExitCode {
    // stdout 只输出命令结果
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let notifier = Arc::new(RecordingNotifier::new());

    let result = execute(cli, notifier.clone()).await;

    for notification in notifier.take() {
        let tag = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Info => "info",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{tag}] {}", notification.message);
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(ConsoleError::Validation(errors)) = e.downcast_ref::<ConsoleError>() {
                for error in errors {
                    eprintln!("  {}: {}", error.field, error.message);
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli, notifier: Arc<RecordingNotifier>) -> anyhow::Result<()> {
    let config = if cli.offline && cli.config.is_none() {
        ConsoleConfig::default()
    } else {
        ConsoleConfig::load_default(cli.config.as_deref())?
    };
    tracing::debug!("Console scope: {}", config.scope.kind());

    let page_size = cli.page_size.unwrap_or(config.default_page_size);
    let ctx = Context {
        scope: config.scope.clone(),
        backend: Backend::new(config, cli.offline),
        page_size,
        notifier,
    };

    let mut stdout = std::io::stdout().lock();
    commands::run(&ctx, cli.command, &mut stdout).await
}
