//! League: a group of teams playing a weekly schedule.

use crate::models::team::TeamId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the league store.
pub type LeagueId = i64;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    /// Week 1 is played on this date; later weeks follow every 7 days.
    pub start_date: NaiveDate,
    /// Current team membership, in insertion order.
    pub team_ids: Vec<TeamId>,
}
