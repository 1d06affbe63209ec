//! Pure schedule arithmetic for campaign runs.
//!
//! All functions operate on naive date-times in the campaign's local clock;
//! callers decide what wall clock that is (the engine currently feeds UTC).
//! Nothing here touches persistence or the system clock.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::campaign::{CampaignStatus, Frequency};

/// Highest day-of-month accepted for monthly schedules. Days 29-31 are
/// rejected at validation so every month has the scheduled day.
pub const MAX_MONTHLY_DAY: u8 = 28;

/// Compute the run slot anchored at `base`.
///
/// - daily: `base` itself at `schedule_time`;
/// - weekly/biweekly: the first day at or after `base` whose weekday equals
///   `schedule_day` (Sunday = 0); a `base` already on that weekday is kept;
/// - monthly: `schedule_day` within `base`'s month. The result may lie before
///   `base`; callers that need a future slot advance the anchor and recompute
///   (see [`first_run_at_or_after`]).
#[must_use]
pub fn next_run(
    base: NaiveDate,
    frequency: Frequency,
    schedule_time: NaiveTime,
    schedule_day: Option<u8>,
) -> NaiveDateTime {
    match frequency {
        Frequency::Daily => base.and_time(schedule_time),
        Frequency::Weekly | Frequency::Biweekly => {
            let target = u32::from(schedule_day.unwrap_or(0) % 7);
            let current = base.weekday().num_days_from_sunday();
            let offset = (target + 7 - current) % 7;
            base.checked_add_days(Days::new(u64::from(offset)))
                .unwrap_or(base)
                .and_time(schedule_time)
        }
        Frequency::Monthly => {
            let day = schedule_day.unwrap_or(1).clamp(1, MAX_MONTHLY_DAY);
            debug_assert!(
                schedule_day.is_none_or(|d| (1..=MAX_MONTHLY_DAY).contains(&d)),
                "monthly schedule_day out of range: {schedule_day:?}"
            );
            base.with_day(u32::from(day))
                .unwrap_or(base)
                .and_time(schedule_time)
        }
    }
}

/// The first run slot at or after `after`. Used when a campaign is created or
/// its schedule fields change.
#[must_use]
pub fn first_run_at_or_after(
    after: NaiveDateTime,
    frequency: Frequency,
    schedule_time: NaiveTime,
    schedule_day: Option<u8>,
) -> NaiveDateTime {
    let candidate = next_run(after.date(), frequency, schedule_time, schedule_day);
    if candidate >= after {
        return candidate;
    }

    let bumped = match frequency {
        Frequency::Daily | Frequency::Weekly | Frequency::Biweekly => {
            after.date().checked_add_days(Days::new(1))
        }
        Frequency::Monthly => after.date().checked_add_months(Months::new(1)),
    }
    .unwrap_or_else(|| after.date());

    next_run(bumped, frequency, schedule_time, schedule_day)
}

/// The slot one period after a completed run: one day, seven days, fourteen
/// days, or one calendar month, re-anchored to the schedule fields.
#[must_use]
pub fn advance_after_run(
    last_run: NaiveDateTime,
    frequency: Frequency,
    schedule_time: NaiveTime,
    schedule_day: Option<u8>,
) -> NaiveDateTime {
    let bumped = match frequency {
        Frequency::Daily => last_run.date().checked_add_days(Days::new(1)),
        Frequency::Weekly => last_run.date().checked_add_days(Days::new(7)),
        Frequency::Biweekly => last_run.date().checked_add_days(Days::new(14)),
        Frequency::Monthly => last_run.date().checked_add_months(Months::new(1)),
    }
    .unwrap_or_else(|| last_run.date());

    next_run(bumped, frequency, schedule_time, schedule_day)
}

/// Whether a campaign should run now. Only active campaigns are due,
/// regardless of how far past `next_execution` the clock is.
#[must_use]
pub fn is_due(
    status: CampaignStatus,
    next_execution: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    status == CampaignStatus::Active && now >= next_execution
}
