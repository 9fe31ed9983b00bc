//! Demo command
//!
//! Runs a fake operation: one spinner step per item, with an optional
//! warning and error along the way, ending in the persisted status line.

use std::time::Duration;

use anyhow::{Context, Result};
use steplog::operation::OPERATION_CONTEXT;
use steplog::{Config, Console, FrameSet, Operation};

/// What the simulated operation does.
#[derive(Debug, Clone)]
pub struct DemoPlan {
    /// Number of steps
    pub steps: usize,
    /// Step that reports a warning
    pub warn_at: Option<usize>,
    /// Step that reports an error
    pub error_at: Option<usize>,
    /// Time spent on each step
    pub delay: Duration,
    /// Fail the operation even without errors
    pub fail: bool,
}

/// Run `plan` on the process terminal.
pub async fn demo(config: &Config, plan: &DemoPlan, frames: Option<&str>) -> Result<()> {
    let mut config = config.clone();
    if let Some(name) = frames {
        config.spinner.frames = FrameSet::by_name(name).context("Invalid --frames")?;
    }

    let console = Console::stdio();
    let logger = config
        .logger(OPERATION_CONTEXT, &console)
        .context("Invalid logger configuration")?;
    let mut op = Operation::new("Demo", logger, config.spinner(&console));

    // A terminal that never answers the cursor query still gets the log lines
    if let Err(err) = op.start(plan.steps).await {
        tracing::warn!(%err, "spinner disabled");
    }

    for step in 1..=plan.steps {
        op.step(&format!("processing item {step}"));
        tokio::time::sleep(plan.delay).await;

        if plan.warn_at == Some(step) {
            op.warn(&format!("item {step} took longer than expected"))
                .await?;
        }
        if plan.error_at == Some(step) {
            op.error(&format!("item {step} failed")).await?;
        }
    }

    let outcome = op.finish(None, plan.fail);
    tracing::debug!(%outcome, "demo finished");
    Ok(())
}
