use super::summary::{self, ViewMode};
use super::ui;
use crate::core::config::HoldingsConfig;
use crate::tracker::Tracker;
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use console::Term;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Re-renders the summary after every polling cycle until interrupted.
pub async fn run(
    tracker: Arc<Tracker>,
    holdings: &HoldingsConfig,
    view: ViewMode,
    interval: Duration,
) -> Result<()> {
    let term = Term::stdout();
    let (handle, mut snapshots) = tracker.spawn_polling(interval);
    let pb = ui::new_spinner("Fetching prices...");
    let mut last_shown: Option<DateTime<Utc>> = None;

    loop {
        tokio::select! {
            snapshot = snapshots.recv() => {
                let Some(snapshot) = snapshot else { break };
                pb.finish_and_clear();

                // Overlapping cycles may finish out of order.
                if last_shown.is_some_and(|shown| snapshot.taken_at < shown) {
                    continue;
                }
                last_shown = Some(snapshot.taken_at);

                term.clear_screen()?;
                println!("{}", summary::evaluate_and_render(holdings, &snapshot, view));
                println!(
                    "\n{}",
                    ui::style_text(
                        &format!(
                            "Updated {} · refreshing every {}s · Ctrl-C to quit",
                            snapshot.taken_at.with_timezone(&Local).format("%H:%M:%S"),
                            interval.as_secs()
                        ),
                        ui::StyleType::Subtle
                    )
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping price watch");
                break;
            }
        }
    }

    pb.finish_and_clear();
    handle.stop();
    Ok(())
}
