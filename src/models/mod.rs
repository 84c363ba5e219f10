//! Data structures for league scheduling: teams, leagues, matches, pairings, session state.

mod game;
mod league;
mod pairing;
mod session;
mod team;

pub use game::{GameMatch, MatchId, NewMatch};
pub use league::{League, LeagueId};
pub use pairing::{CandidateWeek, Conflict, Pairing, Slot};
pub use session::{SchedulingError, WeekSession, WeekState};
pub use team::{Team, TeamId};
