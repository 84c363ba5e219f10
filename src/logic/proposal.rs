//! Candidate week lifecycle: generate, edit, reset, discard.

use crate::logic::conflicts::detect_conflicts;
use crate::logic::pairing::generate_pairings;
use crate::models::{CandidateWeek, SchedulingError, Slot, Team, TeamId, WeekSession, WeekState};
use rand::Rng;

/// Reject any mutation while a commit is in flight.
pub(crate) fn ensure_not_committing(session: &WeekSession) -> Result<(), SchedulingError> {
    if session.state == WeekState::Committing {
        return Err(SchedulingError::CommitInFlight);
    }
    Ok(())
}

/// Generate (or regenerate) the candidate week from a roster snapshot.
///
/// Valid from Uninitialized, Proposed and Edited; regenerating discards manual edits.
/// Fewer than two teams fails with `NotEnoughTeams` and leaves the session untouched.
pub fn propose_week<'s, R: Rng + ?Sized>(
    session: &'s mut WeekSession,
    roster: Vec<Team>,
    week_number: u32,
    rng: &mut R,
) -> Result<&'s CandidateWeek, SchedulingError> {
    ensure_not_committing(session)?;
    use WeekState::*;
    if !matches!(session.state, Uninitialized | Proposed | Edited) {
        return Err(SchedulingError::InvalidState(session.state));
    }
    if roster.len() < 2 {
        return Err(SchedulingError::NotEnoughTeams {
            available: roster.len(),
        });
    }

    let generated = generate_pairings(&roster, rng);
    if let Some(bye) = &generated.bye {
        log::info!(
            "League {} week {}: {} has a bye (odd team count, not scheduled)",
            session.league_id,
            week_number,
            bye.name
        );
    }
    let week = CandidateWeek::new(session.league_id, week_number, generated.pairings, generated.bye);
    log::debug!(
        "League {} week {}: proposed {} pairing(s) ({})",
        session.league_id,
        week_number,
        week.pairings.len(),
        week.proposal_id
    );

    session.conflicts = detect_conflicts(&week.pairings);
    session.roster = roster;
    session.generated = Some(week.clone());
    session.state = Proposed;
    Ok(&*session.candidate.insert(week))
}

/// Set one side of a pairing to a roster team, or clear it with `None`.
///
/// Marks the pairing manual, moves the session to Edited and recomputes conflicts.
pub fn edit_pairing(
    session: &mut WeekSession,
    index: usize,
    slot: Slot,
    team_id: Option<TeamId>,
) -> Result<(), SchedulingError> {
    ensure_not_committing(session)?;
    if !matches!(session.state, WeekState::Proposed | WeekState::Edited) {
        return Err(SchedulingError::InvalidState(session.state));
    }
    let team = match team_id {
        Some(id) => Some(
            session
                .roster_team(id)
                .cloned()
                .ok_or(SchedulingError::TeamNotInRoster(id))?,
        ),
        None => None,
    };

    let candidate = session
        .candidate
        .as_mut()
        .ok_or(SchedulingError::NoCandidateWeek)?;
    let len = candidate.pairings.len();
    let pairing = candidate
        .pairings
        .get_mut(index)
        .ok_or(SchedulingError::PairingOutOfRange { index, len })?;

    let other = match slot {
        Slot::Team1 => Slot::Team2,
        Slot::Team2 => Slot::Team1,
    };
    if let (Some(new), Some(opponent)) = (&team, pairing.team(other)) {
        if new.id == opponent.id {
            return Err(SchedulingError::SelfPairing(new.id));
        }
    }

    *pairing.team_mut(slot) = team;
    pairing.is_manual = true;
    session.conflicts = detect_conflicts(&candidate.pairings);
    session.state = WeekState::Edited;

    if !session.conflicts.is_empty() {
        log::debug!(
            "League {}: {} conflict(s) after editing pairing {}",
            session.league_id,
            session.conflicts.len(),
            index
        );
    }
    Ok(())
}

/// Throw away manual edits and restore the last machine-generated pairings exactly.
pub fn reset_edits(session: &mut WeekSession) -> Result<(), SchedulingError> {
    ensure_not_committing(session)?;
    if !session.can_reset() {
        return Err(SchedulingError::NothingToReset);
    }
    let generated = session
        .generated
        .clone()
        .ok_or(SchedulingError::NoCandidateWeek)?;
    session.conflicts = detect_conflicts(&generated.pairings);
    session.candidate = Some(generated);
    session.state = WeekState::Proposed;
    Ok(())
}

/// Abandon the candidate week without creating matches.
pub fn discard_week(session: &mut WeekSession) -> Result<(), SchedulingError> {
    ensure_not_committing(session)?;
    if !matches!(session.state, WeekState::Proposed | WeekState::Edited) {
        return Err(SchedulingError::InvalidState(session.state));
    }
    session.generated = None;
    session.candidate = None;
    session.conflicts.clear();
    session.state = WeekState::Discarded;
    Ok(())
}
