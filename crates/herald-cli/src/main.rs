use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use herald_core::app::DispatcherBuilder;
use herald_core::domain::{DispatchOutcome, TriggerEvent};
use herald_core::impls::{
    InMemoryTaskRegistry, LogEventSink, NotifyingReporter, ProcessScriptEngine, TracingNotifier,
};
use herald_core::observability::DispatchCounts;
use herald_core::settings::load_settings;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Dispatch one trigger event to the task bound to its action.
#[derive(Debug, Parser)]
#[command(name = "herald", version)]
struct Cli {
    /// Settings file (TOML). A missing file means defaults and no tasks.
    #[arg(long, env = "HERALD_CONFIG", default_value = "herald.toml")]
    config: PathBuf,

    /// Action name of the trigger event.
    #[arg(long)]
    action: String,

    /// Event attribute as key=value; the value is parsed as JSON when possible.
    #[arg(long = "attr", value_parser = parse_attr)]
    attrs: Vec<(String, serde_json::Value)>,
}

#[derive(Debug, Serialize)]
struct Summary {
    dispatch_id: String,
    outcome: DispatchOutcome,
    counts: DispatchCounts,
}

fn parse_attr(s: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = load_settings(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let registry = InMemoryTaskRegistry::from_bindings(settings.task_descriptors())
        .context("building task registry")?;
    tracing::info!(tasks = registry.len(), "task registry ready");

    let dispatcher = DispatcherBuilder::new()
        .registry(Arc::new(registry))
        .engine(Arc::new(ProcessScriptEngine::new(
            settings.engine.interpreter.clone(),
        )))
        .reporter(Arc::new(NotifyingReporter::new(
            TracingNotifier,
            settings.notify_lookup_errors,
        )))
        .sink(Arc::new(LogEventSink))
        .settings(settings)
        .build()
        .context("building dispatcher")?;

    let event = cli
        .attrs
        .into_iter()
        .fold(TriggerEvent::new(cli.action), |event, (k, v)| {
            event.with_attr(k, v)
        });

    let handle = dispatcher.dispatch(event);
    let dispatch_id = handle.dispatch_id().to_string();
    let outcome = handle.outcome().await;
    let counts = dispatcher.counts();
    dispatcher.shutdown_and_join().await;

    let summary = Summary {
        dispatch_id,
        outcome,
        counts,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if outcome.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
