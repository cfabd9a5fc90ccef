//! Live scan progress reporting.
//!
//! A purely observational task: it polls the engine's shared counters twice a
//! second and renders a progress bar. It never mutates scan state, and it is
//! bounded by the engine run via a cancellation token so a cancelled scan
//! cannot leave it hanging on counters that will never reach the total.

use crate::scanner::ScanCounters;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How often the reporter samples the counters.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Spawn the progress reporter task.
///
/// The task ends when the scanned count reaches `total` or when `cancel`
/// fires, whichever comes first.
pub fn spawn(
    counters: Arc<ScanCounters>,
    total: usize,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:30.cyan/blue}] {pos}/{len} ports ({percent}%) {msg}")
            .unwrap()
            .progress_chars("█░░"),
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    bar.finish_and_clear();
                    return;
                }
                _ = ticker.tick() => {}
            }

            let scanned = counters.scanned();
            bar.set_position(scanned as u64);
            bar.set_message(format!("{} open", counters.open()));

            if scanned >= total {
                break;
            }
        }
        bar.finish_with_message("scan complete");
    })
}
