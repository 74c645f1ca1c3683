mod bootstrap;
mod output;
mod report;

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use timeline_core::formatting::render_progress_bar;
use timeline_core::settings::Settings;
use timeline_runtime::client::BackendClient;
use timeline_runtime::poller::PollConfig;
use timeline_runtime::runner::{RunnerConfig, SessionRunner};
use timeline_runtime::session::{AnalysisSession, SessionEvent};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Per-request timeout for backend calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PROGRESS_WIDTH: usize = 30;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Wayback Timeline v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Target: {}, Year: {}, Backend: {}",
        settings.url,
        settings.year,
        settings.api_url
    );

    if settings.url.is_empty() {
        anyhow::bail!("Please enter a website URL.");
    }

    let backend = Arc::new(BackendClient::new(&settings.api_url, REQUEST_TIMEOUT)?);
    let config = RunnerConfig {
        poll: PollConfig {
            interval: Duration::from_secs(u64::from(settings.poll_interval)),
            max_polls: settings.max_polls,
        },
        results_delay: Duration::from_millis(settings.results_delay_ms),
        ..RunnerConfig::default()
    };

    let (event_tx, event_rx) = mpsc::channel(32);
    let (progress_tx, progress_rx) = watch::channel(0.0);
    let runner = SessionRunner::new(backend, config)
        .with_events(event_tx)
        .with_progress(progress_tx);
    let display = tokio::spawn(display_updates(event_rx, progress_rx));

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl+C received; cancelling session");
                cancel.cancel();
            }
        })
    };

    let mut session = AnalysisSession::new(settings.url.clone(), settings.year);
    let result = runner.run(&mut session, cancel).await;

    // Closing the runner's channels ends the display task.
    drop(runner);
    interrupt.abort();
    if let Err(e) = display.await {
        tracing::debug!(error = %e, "display task ended abnormally");
    }

    let analysis = match result {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::error!(error = %e, "analysis failed");
            anyhow::bail!(e.user_message());
        }
    };

    println!();
    print!("{}", report::render_summary(&analysis.summary, &settings.url, settings.year));
    println!();
    print!("{}", report::render_chart(&analysis.chart));
    println!();
    print!("{}", report::render_table(&analysis.rows, settings.rows));

    let export_dir = settings
        .output_dir
        .clone()
        .unwrap_or_else(bootstrap::default_export_dir);
    let written = output::write_exports(
        &analysis,
        &settings.url,
        settings.year,
        &export_dir,
        settings.wants_csv(),
        settings.wants_json(),
    )?;
    for path in &written {
        println!("Exported {}", path.display());
    }

    tracing::info!(
        "Session finished in {:.1}s ({} captures)",
        session.elapsed().num_milliseconds() as f64 / 1000.0,
        analysis.metadata.captures_processed
    );

    Ok(())
}

/// Print session events and progress to stderr until both channels close.
async fn display_updates(mut events: mpsc::Receiver<SessionEvent>, mut progress: watch::Receiver<f64>) {
    let mut progress_open = true;
    let mut bar_visible = false;
    let mut last_status: Option<String> = None;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                if bar_visible {
                    eprintln!();
                    bar_visible = false;
                }
                match event {
                    SessionEvent::JobStarted { job_id } => {
                        eprintln!("Job ID: {job_id}");
                        eprintln!("Status: PENDING");
                        last_status = Some("PENDING".to_string());
                    }
                    SessionEvent::Status { status, .. } => {
                        if last_status.as_deref() != Some(status.as_str()) {
                            eprintln!("Status: {status}");
                            last_status = Some(status);
                        }
                    }
                    SessionEvent::Completed { duration } => {
                        eprintln!("Duration: {}", duration.as_deref().unwrap_or("Completed"));
                        eprintln!("Calculation complete! Loading results...");
                    }
                    SessionEvent::ResultsLoaded { captures } => {
                        eprintln!("Loaded {captures} captures");
                    }
                }
            }
            changed = progress.changed(), if progress_open => {
                if changed.is_err() {
                    progress_open = false;
                    continue;
                }
                let pct = *progress.borrow_and_update();
                eprint!("\r{}", render_progress_bar(pct, PROGRESS_WIDTH));
                let _ = std::io::stderr().flush();
                bar_visible = true;
            }
        }
    }

    if bar_visible {
        eprintln!();
    }
}
