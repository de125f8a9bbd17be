//! Daily wall-clock scheduler.
//!
//! - Jobs are an explicit list of `(DailyTime, action)` pairs built at startup
//! - Each job remembers its next run; a poll loop checks for due jobs every tick
//! - Due jobs run sequentially to completion before the next check
//! - Times are process-local (`chrono::Local`)

use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveTime, TimeZone};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{Error, Result};

/// Something the scheduler can fire. Implementations handle (and log) their own
/// failures; a failed run never stops the scheduler.
#[async_trait]
pub trait ScheduledAction: Send + Sync {
    async fn run(&self);
}

/// Time of day, minute resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DailyTime {
    hour: u32,
    minute: u32,
}

impl DailyTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(Error::Config(format!(
                "invalid time of day: {hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// First occurrence of this time strictly after `now`.
    ///
    /// Days where the local time does not exist (DST gap) are skipped.
    pub fn next_after(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0)?;
        let today = now.date_naive();
        for offset in 0..=2 {
            let date = today + chrono::Duration::days(offset);
            let Some(candidate) = Local.from_local_datetime(&date.and_time(time)).earliest()
            else {
                continue;
            };
            if candidate > now {
                return Some(candidate);
            }
        }
        None
    }
}

impl FromStr for DailyTime {
    type Err = Error;

    /// Parses `HH:MM` (`8:05` is accepted too).
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Config(format!("invalid schedule time (expected HH:MM): {s}"));
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let (h, m) = (h.trim(), m.trim());
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u32 = h.parse().map_err(|_| invalid())?;
        let minute: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl fmt::Display for DailyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

struct DailyJob {
    at: DailyTime,
    action: Arc<dyn ScheduledAction>,
    next_run: Option<DateTime<Local>>,
}

pub struct DailyScheduler {
    jobs: Vec<DailyJob>,
    tick: Duration,
}

impl DailyScheduler {
    /// Register every entry relative to `now`. A time that has already passed
    /// today first fires tomorrow.
    pub fn new(
        entries: Vec<(DailyTime, Arc<dyn ScheduledAction>)>,
        tick: Duration,
        now: DateTime<Local>,
    ) -> Self {
        let jobs = entries
            .into_iter()
            .map(|(at, action)| {
                let next_run = at.next_after(now);
                match next_run {
                    Some(next) => info!("scheduled daily report at {at} (next run {next})"),
                    None => warn!("daily report at {at} has no next run"),
                }
                DailyJob {
                    at,
                    action,
                    next_run,
                }
            })
            .collect();

        Self { jobs, tick }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Earliest upcoming run across all jobs.
    pub fn next_run(&self) -> Option<DateTime<Local>> {
        self.jobs.iter().filter_map(|j| j.next_run).min()
    }

    /// Run every job due at `now`, in registration order. Returns how many ran.
    pub async fn run_pending_at(&mut self, now: DateTime<Local>) -> usize {
        let mut ran = 0usize;
        for job in self.jobs.iter_mut() {
            let Some(next) = job.next_run else {
                continue;
            };
            if next > now {
                continue;
            }

            info!("running daily report scheduled for {}", job.at);
            job.action.run().await;
            ran += 1;

            job.next_run = job.at.next_after(now);
        }
        ran
    }

    /// Poll for due jobs every tick until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            "scheduler started with {} job(s), checking every {}s",
            self.jobs.len(),
            self.tick.as_secs()
        );

        let mut tick = tokio::time::interval(self.tick);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
              biased;
              _ = cancel.cancelled() => break,
              _ = tick.tick() => {
                self.run_pending_at(Local::now()).await;
              }
            }
        }

        info!("scheduler stopped");
    }
}
