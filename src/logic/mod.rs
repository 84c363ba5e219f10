//! Week scheduling logic: pairing, conflicts, candidate lifecycle, commit.

mod commit;
mod conflicts;
mod pairing;
mod planner;
mod proposal;
mod week;

pub use commit::{
    abandon_commit, begin_commit, build_match_requests, complete_session, finish_commit,
};
pub use conflicts::detect_conflicts;
pub use pairing::{generate_pairings, GeneratedPairings};
pub use planner::{commit_week, generate_week, load_week_inputs, WeekInputs};
pub use proposal::{discard_week, edit_pairing, propose_week, reset_edits};
pub use week::{match_date, next_week_number, weeks_in_history, DAYS_PER_WEEK};
