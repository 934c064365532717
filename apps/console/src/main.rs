use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use client_core::{Store, UserListRuntime};
use shared::protocol::Intent;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use user_service::{FailureMode, InMemoryUserService};

mod config;
mod controller;

use config::{load_settings, Settings};
use controller::{
    commands::{ConsoleCommand, HELP},
    orchestration::dispatch_intent,
    view::{render_as, spawn_renderer},
};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "console.toml")]
    config: PathBuf,
    #[arg(long)]
    seed_file: Option<PathBuf>,
    #[arg(long)]
    fail_deletes: bool,
    #[arg(long)]
    latency_ms: Option<u64>,
    #[arg(long)]
    json: bool,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(path) = &self.seed_file {
            settings.seed_file = Some(path.clone());
        }
        if self.fail_deletes {
            settings.fail_deletes = true;
        }
        if let Some(ms) = self.latency_ms {
            settings.service_latency_ms = ms;
        }
        if self.json {
            settings.json_output = true;
        }
    }
}

fn build_service(settings: &Settings) -> Result<InMemoryUserService> {
    let service = match &settings.seed_file {
        Some(path) => InMemoryUserService::from_seed_file(path)?,
        None => InMemoryUserService::with_default_users(),
    };
    let failure = if settings.fail_deletes {
        FailureMode::Delete
    } else {
        FailureMode::None
    };
    Ok(service
        .with_latency(Duration::from_millis(settings.service_latency_ms))
        .with_failure(failure))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    args.apply(&mut settings);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let service = build_service(&settings)?;
    let store = Store::default();
    let runtime = UserListRuntime::new(store.clone(), Arc::new(service));
    let renderer = spawn_renderer(store.watch_state(), settings.json_output);
    tracing::info!(seed_file = ?settings.seed_file, "user admin console started");

    let mut status = String::new();
    dispatch_intent(&runtime, Intent::FetchUsers, &mut status).await;
    println!("{HELP}");
    println!("{status}");
    status.clear();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Quit) => break,
            Ok(ConsoleCommand::Help) => println!("{HELP}"),
            Ok(ConsoleCommand::State) => {
                println!("{}", render_as(&store.snapshot(), settings.json_output));
            }
            Ok(command) => {
                if let Some(intent) = command.intent() {
                    dispatch_intent(&runtime, intent, &mut status).await;
                }
            }
            Err(err) => status = err.to_string(),
        }

        if !status.is_empty() {
            println!("{status}");
            status.clear();
        }
    }

    runtime.shutdown().await;
    renderer.abort();
    Ok(())
}
