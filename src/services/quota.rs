use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::database::GenerationStore;
use crate::errors::Result;

/// Outcome of a daily-quota check. Pure read; admission control happens in
/// the orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct QuotaCheck {
    pub count: i64,
    pub allowed: bool,
}

pub struct QuotaChecker {
    limit: i64,
}

impl QuotaChecker {
    pub fn new(limit: i64) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Counts the user's generations for the calendar day containing `now`
    /// and decides whether one more is admissible.
    pub async fn check(
        &self,
        store: &dyn GenerationStore,
        user_id: Uuid,
        now: DateTime<Local>,
    ) -> Result<QuotaCheck> {
        let (start, end) = day_bounds(now);
        let count = store.count_for_user_between(user_id, start, end).await?;

        Ok(QuotaCheck {
            count,
            allowed: count < self.limit,
        })
    }
}

/// Half-open `[local midnight, next local midnight)` for the day containing
/// `now`, in UTC for range queries against TIMESTAMPTZ columns.
pub fn day_bounds(now: DateTime<Local>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now.date_naive().and_time(NaiveTime::MIN);
    let end = start + Duration::days(1);
    (local_to_utc(start), local_to_utc(end))
}

fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // Midnight can fall inside a DST gap; the day then starts at the
        // first instant after the gap.
        LocalResult::None => Local
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
    }
}
