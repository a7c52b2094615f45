//! Cutoff CLI - binary entry point.
//!
//! ```text
//! main() -> BatchSettings::load() -> BatchDriver::run_with_signal() -> render()
//!                                          ^
//!                      Ctrl+C -> CancellationSignal::request_cancel()
//! ```
//!
//! Logs go to stderr (filter via `RUST_LOG`, default `info`); the final report
//! goes to stdout.

mod effects;
mod render;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cutoff_config::BatchSettings;
use cutoff_core::{
    BatchDriver, CancellationSignal, OperationTimings, RecordEffect, RecordProcessor,
};
use cutoff_types::RecordIndex;

use effects::{FileAppendEffect, UpdateLedger};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

async fn cancel_on_ctrl_c(signal: CancellationSignal) {
    if tokio::signal::ctrl_c().await.is_ok() && signal.request_cancel() {
        tracing::warn!("Ctrl+C received, cancelling remaining records");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let settings = BatchSettings::load().context("invalid configuration")?;

    let write_effect: Arc<dyn RecordEffect> = match &settings.output_path {
        Some(path) => {
            let effect = FileAppendEffect::open(path)
                .with_context(|| format!("failed to open output file {}", path.display()))?;
            tracing::info!(path = %effect.path().display(), "Appending records to file");
            Arc::new(effect)
        }
        None => Arc::new(|_: RecordIndex| {}),
    };
    let ledger = Arc::new(UpdateLedger::default());

    let processor = RecordProcessor::new(
        OperationTimings::new(settings.write, settings.update),
        write_effect,
        ledger.clone(),
    );
    let driver = BatchDriver::new(processor);

    let signal = CancellationSignal::new();
    let ctrl_c = tokio::spawn(cancel_on_ctrl_c(signal.clone()));

    let result = driver
        .run_with_signal(settings.records, settings.deadline, &signal)
        .await;
    ctrl_c.abort();
    let report = result?;

    tracing::info!(
        updated = ledger.updated_records().len(),
        "Database updates applied"
    );

    let rendered = render::render(&report, settings.format)?;
    let mut out = io::stdout().lock();
    out.write_all(rendered.as_bytes())?;
    out.flush()?;

    Ok(())
}
