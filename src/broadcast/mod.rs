//! Scheduled market digest.
//!
//! Sleeps until the next configured slot, posts the watchlist digest to the
//! broadcast chat and repeats. The next slot is always computed from the slot
//! that just fired, so a late wake-up still fires that slot once and never
//! skips the rest of the day. Slots missed by more than the catch-up grace
//! (host suspend, clock jump) are skipped instead of sent in a burst.

pub mod schedule;

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::ChatId;

use crate::core::config;
use crate::pipeline::MarketPipeline;
use crate::telegram::MessageSink;

pub use schedule::DailySchedule;

pub struct BroadcastScheduler {
    pipeline: Arc<MarketPipeline>,
    sink: Arc<dyn MessageSink>,
    chat_id: ChatId,
    schedule: DailySchedule,
    running: AtomicBool,
}

impl BroadcastScheduler {
    pub fn new(
        pipeline: Arc<MarketPipeline>,
        sink: Arc<dyn MessageSink>,
        chat_id: ChatId,
        schedule: DailySchedule,
    ) -> Self {
        Self {
            pipeline,
            sink,
            chat_id,
            schedule,
            running: AtomicBool::new(false),
        }
    }

    pub fn schedule(&self) -> &DailySchedule {
        &self.schedule
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Builds and posts one digest. Delivery failures are logged, not returned.
    pub async fn fire(&self) {
        let text = self.pipeline.digest_text().await;
        match self.sink.send_markdown(self.chat_id, text).await {
            Ok(()) => log::info!("Market digest sent to chat {}", self.chat_id),
            Err(e) => log::error!("Failed to send market digest to chat {}: {}", self.chat_id, e),
        }
    }

    /// Runs until [`stop`](Self::stop) is called or the schedule is empty.
    pub async fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        let grace = config::broadcast::catch_up_grace();
        let mut cursor: DateTime<Utc> = Utc::now();

        while self.running.load(Ordering::SeqCst) {
            let Some((next, skipped)) = self.schedule.next_due(cursor, Utc::now(), grace) else {
                log::warn!("Broadcast schedule has no valid times, scheduler exiting");
                break;
            };
            if skipped > 0 {
                log::warn!("Skipped {} stale digest slot(s), resuming at {}", skipped, next);
            }

            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            log::info!("Next market digest at {} (in {}s)", next, wait.as_secs());
            tokio::time::sleep(wait).await;

            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            cursor = next;
            let late = Utc::now() - next;
            if late > grace {
                log::warn!("Woke {}s after the {} slot, skipping it", late.num_seconds(), next);
                continue;
            }

            self.fire().await;
        }

        self.running.store(false, Ordering::SeqCst);
        log::info!("Broadcast scheduler stopped");
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Spawns the scheduler when `BROADCAST_CHAT_ID` is configured.
pub fn start_broadcast_scheduler(
    pipeline: Arc<MarketPipeline>,
    sink: Arc<dyn MessageSink>,
) -> Option<Arc<BroadcastScheduler>> {
    let Some(chat_id) = *config::broadcast::CHAT_ID else {
        log::info!("BROADCAST_CHAT_ID is not set, scheduled digest disabled");
        return None;
    };

    let schedule = DailySchedule::new(config::broadcast::TIMES.clone(), *config::broadcast::UTC_OFFSET);
    if schedule.is_empty() {
        log::warn!("BROADCAST_TIMES has no valid entries, scheduled digest disabled");
        return None;
    }

    let scheduler = Arc::new(BroadcastScheduler::new(pipeline, sink, ChatId(chat_id), schedule));
    let runner = scheduler.clone();
    tokio::spawn(async move {
        runner.start().await;
    });

    Some(scheduler)
}
