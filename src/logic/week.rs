//! Week numbering and match dates derived from match history.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

use crate::models::GameMatch;

/// Days between consecutive weeks.
pub const DAYS_PER_WEEK: u64 = 7;

/// Next unplayed week: highest stored week + 1, or 1 for an empty history.
///
/// Always derived from history, never cached, so deleting a week out of band is picked up.
pub fn next_week_number(history: &[GameMatch]) -> u32 {
    history.iter().map(|m| m.week_number).max().unwrap_or(0) + 1
}

/// Distinct week numbers present in history, ascending.
pub fn weeks_in_history(history: &[GameMatch]) -> Vec<u32> {
    let weeks: BTreeSet<u32> = history.iter().map(|m| m.week_number).collect();
    weeks.into_iter().collect()
}

/// Date of a week: league start + (week - 1) * 7 days. Week 0 is treated as week 1.
pub fn match_date(start_date: NaiveDate, week_number: u32) -> NaiveDate {
    let offset = u64::from(week_number.saturating_sub(1)) * DAYS_PER_WEEK;
    start_date
        .checked_add_days(Days::new(offset))
        .unwrap_or(NaiveDate::MAX)
}
