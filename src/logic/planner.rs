//! Store-backed glue: load inputs, generate a week, commit a week.

use rand::Rng;

use crate::logic::commit::{abandon_commit, begin_commit, complete_session, finish_commit};
use crate::logic::proposal::propose_week;
use crate::logic::week::next_week_number;
use crate::models::{
    CandidateWeek, GameMatch, LeagueId, SchedulingError, Team, WeekSession, WeekState,
};
use crate::store::LeagueStore;

/// Roster snapshot and next week number for one league, freshly read from the store.
#[derive(Clone, Debug)]
pub struct WeekInputs {
    pub roster: Vec<Team>,
    pub week_number: u32,
}

/// Fetch the roster and recompute the next week from match history.
pub async fn load_week_inputs<S: LeagueStore>(
    store: &S,
    league_id: LeagueId,
) -> Result<WeekInputs, SchedulingError> {
    let roster = store.get_roster(league_id).await?;
    let history = store.get_match_history(league_id).await?;
    Ok(WeekInputs {
        roster,
        week_number: next_week_number(&history),
    })
}

/// Load inputs and (re)generate the session's candidate week.
pub async fn generate_week<'s, S: LeagueStore, R: Rng + ?Sized>(
    store: &S,
    session: &'s mut WeekSession,
    rng: &mut R,
) -> Result<&'s CandidateWeek, SchedulingError> {
    let inputs = load_week_inputs(store, session.league_id).await?;
    propose_week(session, inputs.roster, inputs.week_number, rng)
}

/// Commit the candidate week through the store and close the session.
///
/// On failure, or if this future is dropped before the store answers, the session keeps
/// its candidate in the pre-commit state.
pub async fn commit_week<S: LeagueStore>(
    store: &S,
    session: &mut WeekSession,
    acknowledge_conflicts: bool,
) -> Result<Vec<GameMatch>, SchedulingError> {
    let league_id = session.league_id;
    let league = store.get_league(league_id).await?;
    let history = store.get_match_history(league_id).await?;
    let week_number = next_week_number(&history);

    let requests = begin_commit(session, acknowledge_conflicts, league.start_date, week_number)?;
    let mut guard = AbandonOnDrop(session);
    let result = store.commit_matches(league_id, week_number, &requests).await;
    let created = finish_commit(&mut *guard.0, result)?;
    complete_session(&mut *guard.0)?;
    Ok(created)
}

/// Unlocks the session if the commit future is dropped while the store write is pending.
struct AbandonOnDrop<'a>(&'a mut WeekSession);

impl Drop for AbandonOnDrop<'_> {
    fn drop(&mut self) {
        if self.0.state == WeekState::Committing {
            let _ = abandon_commit(self.0);
        }
    }
}
