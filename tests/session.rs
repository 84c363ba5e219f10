//! Integration tests for the week scheduling state machine.

use chrono::NaiveDate;
use league_pairing_web::{
    abandon_commit, begin_commit, complete_session, discard_week, edit_pairing, finish_commit,
    propose_week, reset_edits, GameMatch, SchedulingError, Slot, StoreError, Team, WeekSession,
    WeekState,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn roster(n: usize) -> Vec<Team> {
    (1..=n as i64).map(|i| Team::new(i, format!("Team {i}"))).collect()
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

fn proposed_session(n: usize, week_number: u32) -> WeekSession {
    let mut session = WeekSession::new(7);
    let mut rng = StdRng::seed_from_u64(11);
    propose_week(&mut session, roster(n), week_number, &mut rng).unwrap();
    session
}

/// Point pairing 1's team 1 at pairing 0's team 1, creating a conflict.
fn introduce_conflict(session: &mut WeekSession) -> i64 {
    let repeated = session.candidate.as_ref().unwrap().pairings[0]
        .team1
        .as_ref()
        .unwrap()
        .id;
    edit_pairing(session, 1, Slot::Team1, Some(repeated)).unwrap();
    repeated
}

#[test]
fn new_session_is_uninitialized() {
    let session = WeekSession::new(7);
    assert_eq!(session.state, WeekState::Uninitialized);
    assert!(session.candidate.is_none());
    assert!(!session.can_confirm());
    assert!(!session.can_reset());
}

#[test]
fn propose_requires_two_teams() {
    let mut session = WeekSession::new(7);
    let mut rng = StdRng::seed_from_u64(0);
    for n in 0..2 {
        assert_eq!(
            propose_week(&mut session, roster(n), 1, &mut rng),
            Err(SchedulingError::NotEnoughTeams { available: n })
        );
        assert_eq!(session.state, WeekState::Uninitialized);
        assert!(session.candidate.is_none());
    }
}

#[test]
fn propose_creates_candidate() {
    let session = proposed_session(4, 3);
    assert_eq!(session.state, WeekState::Proposed);
    let week = session.candidate.as_ref().unwrap();
    assert_eq!(week.league_id, 7);
    assert_eq!(week.week_number, 3);
    assert_eq!(week.pairings.len(), 2);
    assert!(session.conflicts.is_empty());
    assert!(session.can_confirm());
    assert!(!session.can_reset());
    assert_eq!(session.generated.as_ref(), Some(week));
}

#[test]
fn regenerate_replaces_candidate_and_stays_proposed() {
    let mut session = proposed_session(6, 1);
    let first = session.candidate.clone().unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    propose_week(&mut session, roster(6), 1, &mut rng).unwrap();
    let second = session.candidate.as_ref().unwrap();
    assert_eq!(session.state, WeekState::Proposed);
    assert_ne!(first.proposal_id, second.proposal_id);
    assert_eq!(second.pairings.len(), first.pairings.len());
}

#[test]
fn regenerate_from_edited_drops_manual_changes() {
    let mut session = proposed_session(4, 1);
    introduce_conflict(&mut session);
    assert_eq!(session.state, WeekState::Edited);

    let mut rng = StdRng::seed_from_u64(12);
    propose_week(&mut session, roster(4), 1, &mut rng).unwrap();

    assert_eq!(session.state, WeekState::Proposed);
    assert!(session.conflicts.is_empty());
    assert!(!session.can_reset());
    assert_eq!(session.generated, session.candidate);
    let week = session.candidate.as_ref().unwrap();
    assert!(week.pairings.iter().all(|p| !p.is_manual));
}

#[test]
fn manual_edit_reports_conflict() {
    let mut session = proposed_session(4, 1);
    let repeated = introduce_conflict(&mut session);

    assert_eq!(session.state, WeekState::Edited);
    assert_eq!(session.conflicts.len(), 1);
    assert_eq!(session.conflicts[0].team_id, repeated);
    assert_eq!(session.conflicts[0].pairing_indices, vec![0, 1]);
    assert!(session.candidate.as_ref().unwrap().pairings[1].is_manual);
    assert!(!session.candidate.as_ref().unwrap().pairings[0].is_manual);
    assert!(session.can_reset());
}

#[test]
fn reset_restores_exact_generated_week() {
    let mut session = proposed_session(6, 1);
    let generated = session.candidate.clone().unwrap();
    introduce_conflict(&mut session);
    edit_pairing(&mut session, 2, Slot::Team2, None).unwrap();

    reset_edits(&mut session).unwrap();

    assert_eq!(session.state, WeekState::Proposed);
    assert_eq!(session.candidate.as_ref(), Some(&generated));
    assert!(session.conflicts.is_empty());
    assert!(!session.can_reset());
}

#[test]
fn reset_without_edits_is_rejected() {
    let mut session = proposed_session(4, 1);
    assert_eq!(reset_edits(&mut session), Err(SchedulingError::NothingToReset));
    assert_eq!(session.state, WeekState::Proposed);
}

#[test]
fn edit_rejects_unknown_team_and_bad_index() {
    let mut session = proposed_session(4, 1);
    assert_eq!(
        edit_pairing(&mut session, 0, Slot::Team1, Some(99)),
        Err(SchedulingError::TeamNotInRoster(99))
    );
    assert_eq!(
        edit_pairing(&mut session, 5, Slot::Team1, Some(1)),
        Err(SchedulingError::PairingOutOfRange { index: 5, len: 2 })
    );
    assert_eq!(session.state, WeekState::Proposed);
}

#[test]
fn edit_rejects_team_playing_itself() {
    let mut session = proposed_session(4, 1);
    let opponent = session.candidate.as_ref().unwrap().pairings[0]
        .team2
        .as_ref()
        .unwrap()
        .id;
    assert_eq!(
        edit_pairing(&mut session, 0, Slot::Team1, Some(opponent)),
        Err(SchedulingError::SelfPairing(opponent))
    );
}

#[test]
fn edit_before_generation_fails() {
    let mut session = WeekSession::new(7);
    assert_eq!(
        edit_pairing(&mut session, 0, Slot::Team1, Some(1)),
        Err(SchedulingError::InvalidState(WeekState::Uninitialized))
    );
}

#[test]
fn incomplete_pairing_blocks_commit_even_without_conflicts() {
    let mut session = proposed_session(4, 1);
    edit_pairing(&mut session, 1, Slot::Team2, None).unwrap();
    assert!(session.conflicts.is_empty());
    assert!(!session.can_confirm());
    assert_eq!(
        begin_commit(&mut session, true, start_date(), 1),
        Err(SchedulingError::IncompleteAssignment {
            pairing_indices: vec![1]
        })
    );
    assert_eq!(session.state, WeekState::Edited);
}

#[test]
fn conflicts_require_acknowledgement() {
    let mut session = proposed_session(4, 2);
    introduce_conflict(&mut session);
    assert!(session.can_confirm());

    let err = begin_commit(&mut session, false, start_date(), 2).unwrap_err();
    assert!(matches!(err, SchedulingError::UnacknowledgedConflicts { ref conflicts } if conflicts.len() == 1));
    assert_eq!(session.state, WeekState::Edited);

    let requests = begin_commit(&mut session, true, start_date(), 2).unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(session.state, WeekState::Committing);
    let expected_date = NaiveDate::from_ymd_opt(2024, 4, 8).unwrap();
    assert!(requests
        .iter()
        .all(|r| r.league_id == 7 && r.week_number == 2 && r.date == expected_date));
}

#[test]
fn committing_locks_the_working_set() {
    let mut session = proposed_session(4, 1);
    begin_commit(&mut session, false, start_date(), 1).unwrap();

    let mut rng = StdRng::seed_from_u64(5);
    assert_eq!(
        propose_week(&mut session, roster(4), 1, &mut rng).unwrap_err(),
        SchedulingError::CommitInFlight
    );
    assert_eq!(
        edit_pairing(&mut session, 0, Slot::Team1, None),
        Err(SchedulingError::CommitInFlight)
    );
    assert_eq!(discard_week(&mut session), Err(SchedulingError::CommitInFlight));
    assert_eq!(
        begin_commit(&mut session, true, start_date(), 1),
        Err(SchedulingError::CommitInFlight)
    );
    assert!(!session.can_confirm());
}

#[test]
fn commit_restamps_week_number() {
    let mut session = proposed_session(4, 3);
    let requests = begin_commit(&mut session, false, start_date(), 2).unwrap();
    assert!(requests.iter().all(|r| r.week_number == 2));
    assert_eq!(session.candidate.as_ref().unwrap().week_number, 2);
}

#[test]
fn failed_commit_keeps_candidate_for_retry() {
    let mut session = proposed_session(4, 1);
    introduce_conflict(&mut session);
    let before = session.candidate.clone();
    begin_commit(&mut session, true, start_date(), 1).unwrap();

    let err = finish_commit(&mut session, Err(StoreError::Rejected("disk full".into()))).unwrap_err();
    assert_eq!(err, SchedulingError::Persistence(StoreError::Rejected("disk full".into())));
    assert!(err.to_string().contains("disk full"));
    assert_eq!(session.state, WeekState::Edited);
    assert_eq!(session.candidate, before);
    assert_eq!(session.conflicts.len(), 1);
}

#[test]
fn abandoned_commit_unlocks_the_session() {
    let mut session = proposed_session(4, 1);
    introduce_conflict(&mut session);
    let before = session.candidate.clone();
    begin_commit(&mut session, true, start_date(), 1).unwrap();

    abandon_commit(&mut session).unwrap();
    assert_eq!(session.state, WeekState::Edited);
    assert_eq!(session.candidate, before);
    assert!(session.can_confirm());
    edit_pairing(&mut session, 1, Slot::Team2, None).unwrap();
}

#[test]
fn abandon_requires_commit_in_flight() {
    let mut session = proposed_session(4, 1);
    assert_eq!(
        abandon_commit(&mut session),
        Err(SchedulingError::InvalidState(WeekState::Proposed))
    );
    assert_eq!(session.state, WeekState::Proposed);
}

#[test]
fn successful_commit_returns_to_uninitialized() {
    let mut session = proposed_session(4, 1);
    let requests = begin_commit(&mut session, false, start_date(), 1).unwrap();
    let stored: Vec<GameMatch> = requests
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.into_match(i as i64 + 1))
        .collect();

    let created = finish_commit(&mut session, Ok(stored.clone())).unwrap();
    assert_eq!(created, stored);
    assert_eq!(session.state, WeekState::Committed);
    assert!(session.candidate.is_none());

    complete_session(&mut session).unwrap();
    assert_eq!(session.state, WeekState::Uninitialized);
    assert_eq!(session.league_id, 7);
}

#[test]
fn discard_drops_candidate() {
    let mut session = proposed_session(4, 1);
    introduce_conflict(&mut session);
    discard_week(&mut session).unwrap();
    assert_eq!(session.state, WeekState::Discarded);
    assert!(session.candidate.is_none());
    assert!(session.conflicts.is_empty());

    complete_session(&mut session).unwrap();
    assert_eq!(session.state, WeekState::Uninitialized);
}

#[test]
fn complete_requires_finished_session() {
    let mut session = proposed_session(4, 1);
    assert_eq!(
        complete_session(&mut session),
        Err(SchedulingError::InvalidState(WeekState::Proposed))
    );
}
