//! Pairing, Conflict and CandidateWeek: the transient working set for one week.

use crate::models::league::LeagueId;
use crate::models::team::{Team, TeamId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of a pairing an edit targets.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Team1,
    Team2,
}

/// A proposed head-to-head matchup. Either side may be empty after a manual edit.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub team1: Option<Team>,
    pub team2: Option<Team>,
    /// Set once a user has touched this pairing.
    pub is_manual: bool,
}

impl Pairing {
    /// A machine-generated pairing of two teams.
    pub fn generated(team1: Team, team2: Team) -> Self {
        Self {
            team1: Some(team1),
            team2: Some(team2),
            is_manual: false,
        }
    }

    pub fn team(&self, slot: Slot) -> Option<&Team> {
        match slot {
            Slot::Team1 => self.team1.as_ref(),
            Slot::Team2 => self.team2.as_ref(),
        }
    }

    pub fn team_mut(&mut self, slot: Slot) -> &mut Option<Team> {
        match slot {
            Slot::Team1 => &mut self.team1,
            Slot::Team2 => &mut self.team2,
        }
    }

    /// Both sides are filled in.
    pub fn is_complete(&self) -> bool {
        self.team1.is_some() && self.team2.is_some()
    }

    /// Team ids present in this pairing, team 1 first.
    pub fn team_ids(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.team1
            .iter()
            .chain(self.team2.iter())
            .map(|t| t.id)
    }
}

/// A team that appears in more than one pairing of the same week.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub team_id: TeamId,
    /// Every pairing index the team appears in, ascending.
    pub pairing_indices: Vec<usize>,
}

/// The pairings proposed for a league's next unplayed week.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CandidateWeek {
    /// Fresh for every generation; lets clients detect a regenerate under them.
    pub proposal_id: Uuid,
    pub league_id: LeagueId,
    pub week_number: u32,
    pub pairings: Vec<Pairing>,
    /// Odd-team-out: dropped from this week, not scheduled.
    pub bye: Option<Team>,
}

impl CandidateWeek {
    pub fn new(league_id: LeagueId, week_number: u32, pairings: Vec<Pairing>, bye: Option<Team>) -> Self {
        Self {
            proposal_id: Uuid::new_v4(),
            league_id,
            week_number,
            pairings,
            bye,
        }
    }

    /// Indices of pairings with an empty side.
    pub fn incomplete_pairings(&self) -> Vec<usize> {
        self.pairings
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_complete())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn has_manual_edits(&self) -> bool {
        self.pairings.iter().any(|p| p.is_manual)
    }
}
