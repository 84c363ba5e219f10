//! WeekSession, WeekState and SchedulingError.

use crate::models::league::LeagueId;
use crate::models::pairing::{CandidateWeek, Conflict};
use crate::models::team::{Team, TeamId};
use crate::store::StoreError;
use serde::{Deserialize, Serialize};

/// Errors that can occur while scheduling a week.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SchedulingError {
    /// Fewer than two teams in the roster; nothing can be paired.
    NotEnoughTeams { available: usize },
    /// No candidate week has been generated yet.
    NoCandidateWeek,
    /// Session is not in a state that allows this action.
    InvalidState(WeekState),
    /// A commit is in flight; the working set is locked until it resolves.
    CommitInFlight,
    PairingOutOfRange { index: usize, len: usize },
    /// Team is not part of the league roster snapshot.
    TeamNotInRoster(TeamId),
    /// The edit would pair a team with itself.
    SelfPairing(TeamId),
    /// Reset requested but no pairing was edited.
    NothingToReset,
    /// Some pairings have an empty side; commit is blocked.
    IncompleteAssignment { pairing_indices: Vec<usize> },
    /// Pairings repeat a team and the user has not acknowledged it.
    UnacknowledgedConflicts { conflicts: Vec<Conflict> },
    /// The store rejected the operation.
    Persistence(StoreError),
}

impl std::fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulingError::NotEnoughTeams { available: 0 } => {
                write!(f, "No teams available to create matches")
            }
            SchedulingError::NotEnoughTeams { available } => {
                write!(f, "Need at least two teams to create matches (have {})", available)
            }
            SchedulingError::NoCandidateWeek => write!(f, "No matches have been generated"),
            SchedulingError::InvalidState(state) => {
                write!(f, "Invalid state for this action ({:?})", state)
            }
            SchedulingError::CommitInFlight => write!(f, "Matches are being saved"),
            SchedulingError::PairingOutOfRange { index, len } => {
                write!(f, "Pairing {} does not exist (week has {})", index, len)
            }
            SchedulingError::TeamNotInRoster(id) => write!(f, "Team {} is not in this league", id),
            SchedulingError::SelfPairing(id) => write!(f, "Team {} cannot play itself", id),
            SchedulingError::NothingToReset => write!(f, "There are no manual changes to reset"),
            SchedulingError::IncompleteAssignment { pairing_indices } => {
                write!(f, "Pairings {:?} are missing a team", pairing_indices)
            }
            SchedulingError::UnacknowledgedConflicts { conflicts } => write!(
                f,
                "There are conflicts in the matchups ({} team(s) appear in multiple matches)",
                conflicts.len()
            ),
            SchedulingError::Persistence(e) => write!(f, "Failed to save matches: {}", e),
        }
    }
}

impl std::error::Error for SchedulingError {}

impl From<StoreError> for SchedulingError {
    fn from(e: StoreError) -> Self {
        SchedulingError::Persistence(e)
    }
}

/// Where a league's week scheduling session currently stands.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekState {
    /// No candidate week.
    #[default]
    Uninitialized,
    /// Machine-generated pairings, untouched.
    Proposed,
    /// At least one pairing changed by hand; conflicts may exist.
    Edited,
    /// Batch handed to the store; no mutation allowed until it resolves.
    Committing,
    /// Matches stored; waits for the history reload.
    Committed,
    /// Candidate thrown away; waits for the history reload.
    Discarded,
}

/// One league's scheduling session. Exclusively owned; never shared across leagues.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WeekSession {
    pub league_id: LeagueId,
    pub state: WeekState,
    /// Roster the current candidate was generated from; edits may only pick these teams.
    pub roster: Vec<Team>,
    /// Last machine-generated week, restored by reset.
    pub generated: Option<CandidateWeek>,
    /// Working copy shown to and edited by the user.
    pub candidate: Option<CandidateWeek>,
    /// Recomputed from `candidate` after every mutation.
    pub conflicts: Vec<Conflict>,
    /// State to return to when an in-flight commit fails.
    pub pre_commit_state: Option<WeekState>,
}

impl WeekSession {
    pub fn new(league_id: LeagueId) -> Self {
        Self {
            league_id,
            ..Self::default()
        }
    }

    /// Reset is only offered once a pairing has been edited by hand.
    pub fn can_reset(&self) -> bool {
        self.state == WeekState::Edited
            && self
                .candidate
                .as_ref()
                .is_some_and(CandidateWeek::has_manual_edits)
    }

    /// Confirm is disabled while any pairing is incomplete, independent of conflicts.
    pub fn can_confirm(&self) -> bool {
        matches!(self.state, WeekState::Proposed | WeekState::Edited)
            && self
                .candidate
                .as_ref()
                .is_some_and(|c| !c.pairings.is_empty() && c.incomplete_pairings().is_empty())
    }

    pub fn roster_team(&self, id: TeamId) -> Option<&Team> {
        self.roster.iter().find(|t| t.id == id)
    }
}
