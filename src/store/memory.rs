//! In-memory league store used by the web binary and by tests.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::logic::weeks_in_history;
use crate::models::{GameMatch, League, LeagueId, MatchId, NewMatch, Team, TeamId};
use crate::store::{LeagueStore, StoreError};

#[derive(Debug, Default)]
struct Inner {
    teams: BTreeMap<TeamId, Team>,
    leagues: BTreeMap<LeagueId, League>,
    matches: Vec<GameMatch>,
    next_match_id: MatchId,
}

impl Inner {
    fn league(&self, league_id: LeagueId) -> Result<&League, StoreError> {
        self.leagues.get(&league_id).ok_or(StoreError::NotFound {
            entity: "League",
            id: league_id,
        })
    }

    fn check_teams_exist(&self, team_ids: &[TeamId]) -> Result<(), StoreError> {
        match team_ids.iter().find(|id| !self.teams.contains_key(*id)) {
            Some(&id) => Err(StoreError::NotFound { entity: "Team", id }),
            None => Ok(()),
        }
    }
}

/// Teams, leagues and matches held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a team with an externally assigned id.
    pub async fn upsert_team(&self, team: Team) {
        self.inner.write().await.teams.insert(team.id, team);
    }

    /// Create a team with the next free id.
    pub async fn create_team(&self, name: impl Into<String>) -> Result<Team, StoreError> {
        let mut g = self.inner.write().await;
        let id = next_id(g.teams.keys().next_back().copied(), "team")?;
        let team = Team::new(id, name);
        g.teams.insert(id, team.clone());
        Ok(team)
    }

    pub async fn list_teams(&self) -> Vec<Team> {
        self.inner.read().await.teams.values().cloned().collect()
    }

    /// Create a league. All teams must already exist; duplicates are collapsed.
    pub async fn create_league(
        &self,
        name: impl Into<String>,
        start_date: NaiveDate,
        team_ids: Vec<TeamId>,
    ) -> Result<League, StoreError> {
        let mut g = self.inner.write().await;
        g.check_teams_exist(&team_ids)?;
        let id = next_id(g.leagues.keys().next_back().copied(), "league")?;
        let league = League {
            id,
            name: name.into(),
            start_date,
            team_ids: dedup_keep_order(team_ids),
        };
        g.leagues.insert(id, league.clone());
        log::info!("Created league {} ({} teams)", league.id, league.team_ids.len());
        Ok(league)
    }

    pub async fn list_leagues(&self) -> Vec<League> {
        self.inner.read().await.leagues.values().cloned().collect()
    }

    /// Replace a league's team membership.
    pub async fn set_league_teams(
        &self,
        league_id: LeagueId,
        team_ids: Vec<TeamId>,
    ) -> Result<League, StoreError> {
        let mut g = self.inner.write().await;
        g.check_teams_exist(&team_ids)?;
        let league = g.leagues.get_mut(&league_id).ok_or(StoreError::NotFound {
            entity: "League",
            id: league_id,
        })?;
        league.team_ids = dedup_keep_order(team_ids);
        Ok(league.clone())
    }

    /// Week numbers that have at least one match, ascending.
    pub async fn available_weeks(&self, league_id: LeagueId) -> Result<Vec<u32>, StoreError> {
        let g = self.inner.read().await;
        g.league(league_id)?;
        let history: Vec<GameMatch> = g
            .matches
            .iter()
            .filter(|m| m.league_id == league_id)
            .cloned()
            .collect();
        Ok(weeks_in_history(&history))
    }

    pub async fn matches_for_week(
        &self,
        league_id: LeagueId,
        week_number: u32,
    ) -> Result<Vec<GameMatch>, StoreError> {
        let g = self.inner.read().await;
        g.league(league_id)?;
        Ok(g.matches
            .iter()
            .filter(|m| m.league_id == league_id && m.week_number == week_number)
            .cloned()
            .collect())
    }

    /// Delete every match of one week. Returns how many were removed.
    pub async fn delete_week(&self, league_id: LeagueId, week_number: u32) -> Result<usize, StoreError> {
        let mut g = self.inner.write().await;
        g.league(league_id)?;
        let before = g.matches.len();
        g.matches
            .retain(|m| !(m.league_id == league_id && m.week_number == week_number));
        let removed = before - g.matches.len();
        log::info!("Deleted week {} of league {} ({} matches)", week_number, league_id, removed);
        Ok(removed)
    }
}

impl LeagueStore for MemoryStore {
    async fn get_league(&self, league_id: LeagueId) -> Result<League, StoreError> {
        self.inner.read().await.league(league_id).cloned()
    }

    async fn get_roster(&self, league_id: LeagueId) -> Result<Vec<Team>, StoreError> {
        let g = self.inner.read().await;
        let league = g.league(league_id)?;
        // Teams deleted out of band drop out of the roster instead of failing it.
        Ok(league
            .team_ids
            .iter()
            .filter_map(|id| g.teams.get(id).cloned())
            .collect())
    }

    async fn get_match_history(&self, league_id: LeagueId) -> Result<Vec<GameMatch>, StoreError> {
        let g = self.inner.read().await;
        g.league(league_id)?;
        Ok(g.matches
            .iter()
            .filter(|m| m.league_id == league_id)
            .cloned()
            .collect())
    }

    async fn commit_matches(
        &self,
        league_id: LeagueId,
        week_number: u32,
        matches: &[NewMatch],
    ) -> Result<Vec<GameMatch>, StoreError> {
        let mut g = self.inner.write().await;
        let members: BTreeSet<TeamId> = g.league(league_id)?.team_ids.iter().copied().collect();

        // Validate the whole batch before touching anything.
        for m in matches {
            if m.league_id != league_id || m.week_number != week_number {
                return Err(StoreError::Rejected(format!(
                    "match for league {} week {} does not belong to league {} week {}",
                    m.league_id, m.week_number, league_id, week_number
                )));
            }
            for id in [m.team1_id, m.team2_id] {
                if !members.contains(&id) {
                    return Err(StoreError::Rejected(format!(
                        "team {} is not a member of league {}",
                        id, league_id
                    )));
                }
            }
            if m.team1_id == m.team2_id {
                return Err(StoreError::Rejected(format!("team {} cannot play itself", m.team1_id)));
            }
        }

        let mut created = Vec::with_capacity(matches.len());
        for m in matches {
            g.next_match_id += 1;
            let stored = m.clone().into_match(g.next_match_id);
            g.matches.push(stored.clone());
            created.push(stored);
        }
        Ok(created)
    }
}

/// One past the highest id in use, or 1 for an empty table.
fn next_id(last: Option<i64>, entity: &str) -> Result<i64, StoreError> {
    match last {
        None => Ok(1),
        Some(last) => last
            .checked_add(1)
            .ok_or_else(|| StoreError::Rejected(format!("no {} ids left", entity))),
    }
}

fn dedup_keep_order(ids: Vec<TeamId>) -> Vec<TeamId> {
    let mut seen = BTreeSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
