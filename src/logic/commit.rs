//! Match commit: turn a confirmed candidate week into match-creation requests.

use chrono::NaiveDate;

use crate::logic::proposal::ensure_not_committing;
use crate::logic::week::match_date;
use crate::models::{
    CandidateWeek, GameMatch, NewMatch, SchedulingError, WeekSession, WeekState,
};
use crate::store::StoreError;

/// One request per pairing, all stamped with the week's league, number and date.
///
/// Fails with `IncompleteAssignment` if any pairing has an empty side.
pub fn build_match_requests(
    week: &CandidateWeek,
    start_date: NaiveDate,
) -> Result<Vec<NewMatch>, SchedulingError> {
    let incomplete = week.incomplete_pairings();
    if !incomplete.is_empty() {
        return Err(SchedulingError::IncompleteAssignment {
            pairing_indices: incomplete,
        });
    }
    let date = match_date(start_date, week.week_number);
    Ok(week
        .pairings
        .iter()
        .filter_map(|p| Some((p.team1.as_ref()?, p.team2.as_ref()?)))
        .map(|(team1, team2)| NewMatch {
            league_id: week.league_id,
            week_number: week.week_number,
            team1_id: team1.id,
            team2_id: team2.id,
            date,
        })
        .collect())
}

/// Confirm the candidate week and lock it for the store write.
///
/// `week_number` is the freshly recomputed next week; the candidate is re-stamped with it.
/// Incomplete pairings always block. Conflicts block unless `acknowledge_conflicts` is set.
/// On success the session is Committing and the returned batch goes to the store.
pub fn begin_commit(
    session: &mut WeekSession,
    acknowledge_conflicts: bool,
    start_date: NaiveDate,
    week_number: u32,
) -> Result<Vec<NewMatch>, SchedulingError> {
    ensure_not_committing(session)?;
    let previous = session.state;
    if !matches!(previous, WeekState::Proposed | WeekState::Edited) {
        return Err(SchedulingError::InvalidState(previous));
    }
    let candidate = session
        .candidate
        .as_mut()
        .ok_or(SchedulingError::NoCandidateWeek)?;

    let incomplete = candidate.incomplete_pairings();
    if !incomplete.is_empty() {
        return Err(SchedulingError::IncompleteAssignment {
            pairing_indices: incomplete,
        });
    }
    if !session.conflicts.is_empty() {
        if !acknowledge_conflicts {
            return Err(SchedulingError::UnacknowledgedConflicts {
                conflicts: session.conflicts.clone(),
            });
        }
        log::warn!(
            "League {}: committing week with {} acknowledged conflict(s)",
            session.league_id,
            session.conflicts.len()
        );
    }

    if candidate.week_number != week_number {
        log::info!(
            "League {}: next week moved from {} to {} since generation",
            session.league_id,
            candidate.week_number,
            week_number
        );
        candidate.week_number = week_number;
        if let Some(generated) = session.generated.as_mut() {
            generated.week_number = week_number;
        }
    }

    let requests = build_match_requests(candidate, start_date)?;
    session.pre_commit_state = Some(previous);
    session.state = WeekState::Committing;
    Ok(requests)
}

/// Apply the store's answer to an in-flight commit.
///
/// Success drops the candidate and leaves the session Committed. Failure restores the
/// pre-commit state with the candidate intact so the user can retry; the store's reason
/// is passed through unchanged.
pub fn finish_commit(
    session: &mut WeekSession,
    result: Result<Vec<GameMatch>, StoreError>,
) -> Result<Vec<GameMatch>, SchedulingError> {
    if session.state != WeekState::Committing {
        return Err(SchedulingError::InvalidState(session.state));
    }
    match result {
        Ok(created) => {
            log::info!(
                "League {}: saved {} match(es)",
                session.league_id,
                created.len()
            );
            session.generated = None;
            session.candidate = None;
            session.conflicts.clear();
            session.pre_commit_state = None;
            session.state = WeekState::Committed;
            Ok(created)
        }
        Err(e) => {
            log::error!("League {}: failed to save matches: {}", session.league_id, e);
            session.state = session.pre_commit_state.take().unwrap_or(WeekState::Edited);
            Err(SchedulingError::Persistence(e))
        }
    }
}

/// Unlock a session whose store write was abandoned before it answered.
///
/// The core does not assume anything was stored: the session returns to its pre-commit
/// state with the candidate intact. The next confirm recomputes the week number.
pub fn abandon_commit(session: &mut WeekSession) -> Result<(), SchedulingError> {
    if session.state != WeekState::Committing {
        return Err(SchedulingError::InvalidState(session.state));
    }
    log::warn!(
        "League {}: commit abandoned before the store answered",
        session.league_id
    );
    session.state = session.pre_commit_state.take().unwrap_or(WeekState::Edited);
    Ok(())
}

/// Close a finished session (Committed or Discarded) after the history reload.
pub fn complete_session(session: &mut WeekSession) -> Result<(), SchedulingError> {
    if !matches!(session.state, WeekState::Committed | WeekState::Discarded) {
        return Err(SchedulingError::InvalidState(session.state));
    }
    let league_id = session.league_id;
    *session = WeekSession::new(league_id);
    Ok(())
}
