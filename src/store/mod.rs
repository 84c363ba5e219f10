//! Seam to the team/league/match store that owns persistence.
//!
//! The pairing engine only reads rosters and match history and writes one batch of
//! matches per committed week. Everything else about storage belongs to the store.

mod error;
mod import;
mod memory;

use std::future::Future;

use crate::models::{GameMatch, League, LeagueId, NewMatch, Team};

pub use error::StoreError;
pub use import::read_teams_csv;
pub use memory::MemoryStore;

/// Operations the scheduling core needs from the store.
///
/// Calls may suspend; the core waits for them without a timeout.
pub trait LeagueStore: Send + Sync {
    /// League record, including its start date.
    fn get_league(&self, league_id: LeagueId) -> impl Future<Output = Result<League, StoreError>> + Send;

    /// Teams currently in the league.
    fn get_roster(&self, league_id: LeagueId) -> impl Future<Output = Result<Vec<Team>, StoreError>> + Send;

    /// Every stored match of the league, any week.
    fn get_match_history(
        &self,
        league_id: LeagueId,
    ) -> impl Future<Output = Result<Vec<GameMatch>, StoreError>> + Send;

    /// Store one week's matches as a batch. Treated as all-or-nothing by the caller.
    fn commit_matches(
        &self,
        league_id: LeagueId,
        week_number: u32,
        matches: &[NewMatch],
    ) -> impl Future<Output = Result<Vec<GameMatch>, StoreError>> + Send;
}
