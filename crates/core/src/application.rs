use crate::domain::{UpsertOutcome, PROFILE_KEY_FIELD, REEL_KEY_FIELD};
use crate::extract::{extract_profile, extract_reels};
use crate::fetcher::Fetcher;
use crate::ports::Sleeper;
use crate::roster::Roster;
use crate::upsert::Upserter;
use crate::utils::now_timestamp;
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_PROFILES_TABLE: &str = "Instagram Profiles";
pub const DEFAULT_REELS_TABLE: &str = "Reels";

/// Where records go and how fast the roster is walked
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub profiles_table: String,
    pub reels_table: String,
    pub profile_key_field: String,
    pub reel_key_field: String,
    /// Pause between usernames
    pub request_delay: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            profiles_table: DEFAULT_PROFILES_TABLE.to_string(),
            reels_table: DEFAULT_REELS_TABLE.to_string(),
            profile_key_field: PROFILE_KEY_FIELD.to_string(),
            reel_key_field: REEL_KEY_FIELD.to_string(),
            request_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    /// `index` is 1-based
    Processing { index: usize, total: usize },
    Done,
}

/// Totals reported at the end of a run.
///
/// `profiles_*` and `reels_*` both count usernames. A username's reels fail
/// when the fetch is absent, the list is empty, or any reel write fails.
/// `reels_written` and `reels_skipped` count individual reel items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub usernames: usize,
    pub profiles_ok: usize,
    pub profiles_failed: usize,
    pub reels_ok: usize,
    pub reels_failed: usize,
    pub reels_written: usize,
    pub reels_skipped: usize,
}

/// Walks a roster sequentially: fetch, extract and upsert per username
pub struct Runner {
    fetcher: Fetcher,
    upserter: Upserter,
    sleeper: Box<dyn Sleeper>,
    config: RunConfig,
    state: RunState,
}

impl Runner {
    /// Creates a new Runner with the given collaborators
    pub fn new(
        fetcher: Fetcher,
        upserter: Upserter,
        sleeper: Box<dyn Sleeper>,
        config: RunConfig,
    ) -> Self {
        Self {
            fetcher,
            upserter,
            sleeper,
            config,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Processes every handle in roster order. Failures are counted and
    /// logged per item; nothing aborts the remaining roster.
    pub fn run(&mut self, roster: &Roster) -> RunSummary {
        let total = roster.len();
        let mut summary = RunSummary {
            usernames: total,
            ..RunSummary::default()
        };
        info!(total, "starting collection run");

        for (i, handle) in roster.handles().iter().enumerate() {
            self.state = RunState::Processing {
                index: i + 1,
                total,
            };
            info!(handle = %handle, "processing {} ({}/{})", handle, i + 1, total);

            let checked_at = now_timestamp();
            self.sync_profile(handle, &checked_at, &mut summary);
            self.sync_reels(handle, &checked_at, &mut summary);

            if i + 1 < total {
                self.sleeper.sleep(self.config.request_delay);
            }
        }

        self.state = RunState::Done;
        info!(
            usernames = summary.usernames,
            profiles_ok = summary.profiles_ok,
            profiles_failed = summary.profiles_failed,
            reels_ok = summary.reels_ok,
            reels_failed = summary.reels_failed,
            reels_written = summary.reels_written,
            reels_skipped = summary.reels_skipped,
            "collection run complete"
        );
        summary
    }

    fn sync_profile(&self, handle: &str, checked_at: &str, summary: &mut RunSummary) {
        let Some(raw) = self.fetcher.fetch_profile(handle) else {
            summary.profiles_failed += 1;
            return;
        };

        let record = extract_profile(&raw, handle, checked_at);
        match self.upserter.upsert_record(
            &self.config.profiles_table,
            &self.config.profile_key_field,
            &record,
        ) {
            Ok(outcome) => {
                info!(
                    handle,
                    followers = record.follower_count,
                    "{} profile",
                    verb(outcome)
                );
                summary.profiles_ok += 1;
            }
            Err(e) => {
                error!(handle, error = %e, "failed to write profile");
                summary.profiles_failed += 1;
            }
        }
    }

    fn sync_reels(&self, handle: &str, checked_at: &str, summary: &mut RunSummary) {
        let Some(items) = self.fetcher.fetch_reels(handle) else {
            summary.reels_failed += 1;
            return;
        };
        if items.is_empty() {
            warn!(handle, "no reels found");
            summary.reels_failed += 1;
            return;
        }

        let batch = extract_reels(&items, handle, checked_at);
        summary.reels_skipped += batch.skipped;

        let mut write_failures = 0;
        for reel in &batch.reels {
            match self.upserter.upsert_record(
                &self.config.reels_table,
                &self.config.reel_key_field,
                reel,
            ) {
                Ok(outcome) => {
                    info!(
                        handle,
                        reel_id = %reel.reel_id,
                        views = reel.view_count,
                        likes = reel.like_count,
                        "{} reel",
                        verb(outcome)
                    );
                    summary.reels_written += 1;
                }
                Err(e) => {
                    error!(handle, reel_id = %reel.reel_id, error = %e, "failed to write reel");
                    write_failures += 1;
                }
            }
        }

        if write_failures == 0 {
            summary.reels_ok += 1;
        } else {
            summary.reels_failed += 1;
        }
    }
}

fn verb(outcome: UpsertOutcome) -> &'static str {
    match outcome {
        UpsertOutcome::Created => "created",
        UpsertOutcome::Updated => "updated",
    }
}
