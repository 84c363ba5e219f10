//! League pairing web app: library with models, weekly pairing logic and the store seam.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    abandon_commit, begin_commit, build_match_requests, commit_week, complete_session,
    detect_conflicts, discard_week, edit_pairing, finish_commit, generate_pairings, generate_week,
    load_week_inputs, match_date, next_week_number, propose_week, reset_edits,
    weeks_in_history, GeneratedPairings, WeekInputs,
};
pub use models::{
    CandidateWeek, Conflict, GameMatch, League, LeagueId, MatchId, NewMatch, Pairing,
    SchedulingError, Slot, Team, TeamId, WeekSession, WeekState,
};
pub use store::{read_teams_csv, LeagueStore, MemoryStore, StoreError};
