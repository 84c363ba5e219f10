//! Persisted match records and the requests that create them.

use crate::models::league::LeagueId;
use crate::models::team::TeamId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the match store.
pub type MatchId = i64;

/// A match as stored for a league. Never mutated by the pairing engine.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub league_id: LeagueId,
    /// 1-based week slot.
    pub week_number: u32,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub date: NaiveDate,
}

/// A match-creation request produced by committing a week.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewMatch {
    pub league_id: LeagueId,
    pub week_number: u32,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub date: NaiveDate,
}

impl NewMatch {
    /// Attach the id handed out by the store.
    pub fn into_match(self, id: MatchId) -> GameMatch {
        GameMatch {
            id,
            league_id: self.league_id,
            week_number: self.week_number,
            team1_id: self.team1_id,
            team2_id: self.team2_id,
            date: self.date,
        }
    }
}
