use std::panic;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cli::Cli;
use crate::config::Config;
use crate::core::artifact::ArtifactStore;
use crate::core::harness::Harness;
use crate::core::pipeline::pool::WorkerPool;
use crate::core::targets;
use crate::native::compiler::GnuCppCompiler;
use crate::native::process::NativeProcessRunner;
use crate::report::ConsoleReporter;

mod app;
mod cli;
mod config;
mod constants;
mod core;
mod native;
mod report;

#[cfg(test)]
mod stubs;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    set_panic_hook();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(jobs) = cli.jobs {
        config.workers = jobs.get();
    }
    if cli.no_color {
        config.color = false;
    }
    tracing::debug!("Configuration: {:?}", config);

    let plan = targets::plan(&cli.targets)?;

    let process = Arc::new(NativeProcessRunner::new());
    let compiler = Arc::new(GnuCppCompiler::new(
        &config.compiler,
        process.clone(),
        config.compile_budget,
    ));
    let artifacts = ArtifactStore::new(&config.artifact_dir)?;
    let harness = Harness::new(compiler, process, artifacts, config.execute_budget);
    let pool = WorkerPool::new(
        config.workers,
        config.queue_capacity,
        Arc::new(harness.clone()),
    );
    let app = App::new(harness, pool, ConsoleReporter::new(config.color));

    let failed = app.execute(plan, &mut std::io::stdout().lock()).await?;

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn set_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        tracing::error!(
            message = "panic occurred",
            panic = %panic_info
        );
    }));
}
