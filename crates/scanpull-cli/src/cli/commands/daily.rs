//! `scanpull daily`: run the pipeline once a day at a fixed local time.

use anyhow::{anyhow, Context, Result};
use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use scanpull_core::config::ScanpullConfig;
use scanpull_core::transport::CurlTransport;
use scanpull_core::RunSettings;
use std::thread;
use tracing::{info, warn};

use super::run::{print_outcome, run_logged};

/// Parse `HH:MM` (24h).
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .with_context(|| format!("invalid time of day {:?}, expected HH:MM", s))
}

/// First moment strictly after `now` whose wall-clock time is `at`.
pub fn next_run_after(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + Days::new(1)
    }
}

/// Never returns except on a configuration error. A failed run is already
/// logged by `run_logged`; the loop just waits for the next day.
pub fn run_daily(cfg: &ScanpullConfig, at: Option<&str>) -> Result<()> {
    let at = at
        .or(cfg.daily_at.as_deref())
        .ok_or_else(|| anyhow!("no run time: pass --at HH:MM or set daily_at in config"))?;
    let at = parse_time_of_day(at)?;
    let settings = RunSettings::from_config(cfg)?;
    let transport = CurlTransport::new(&cfg.http);

    loop {
        let now = Local::now().naive_local();
        let next = next_run_after(now, at);
        info!("next run at {}", next);
        // A negative delta only happens if the clock jumps; run right away.
        thread::sleep((next - now).to_std().unwrap_or_default());

        match run_logged(&settings, &transport) {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => warn!("run failed, retrying tomorrow: {:#}", e),
        }
    }
}
