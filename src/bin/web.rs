//! Single binary web server: REST API for teams, leagues and weekly match pairing.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, TEAMS_CSV (seed teams), STATIC_DIR, SESSION_TIMEOUT_HOURS.

use actix_files::Files;
use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::NaiveDate;
use league_pairing_web::{
    begin_commit, complete_session, discard_week, edit_pairing, finish_commit, load_week_inputs,
    next_week_number, propose_week, read_teams_csv, reset_edits, CandidateWeek, Conflict,
    LeagueId, LeagueStore, MemoryStore, SchedulingError, Slot, StoreError, TeamId, WeekSession,
    WeekState,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-league entry: scheduling session + last activity time (for auto-cleanup).
struct SessionEntry {
    session: WeekSession,
    last_activity: Instant,
}

impl SessionEntry {
    fn new(league_id: LeagueId) -> Self {
        Self {
            session: WeekSession::new(league_id),
            last_activity: Instant::now(),
        }
    }
}

/// In-memory scheduling sessions, one per league. Never held across a store call.
type Sessions = Data<RwLock<HashMap<LeagueId, SessionEntry>>>;

type Store = Data<MemoryStore>;

/// Server settings read from the environment.
struct Config {
    host: String,
    port: u16,
    teams_csv: Option<PathBuf>,
    static_dir: Option<PathBuf>,
    session_timeout: Duration,
}

impl Config {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        let session_timeout_hours = std::env::var("SESSION_TIMEOUT_HOURS")
            .ok()
            .and_then(|h| h.parse().ok())
            .unwrap_or_else(default_session_timeout_hours);
        Self {
            host,
            port,
            teams_csv: std::env::var_os("TEAMS_CSV").map(PathBuf::from),
            static_dir: std::env::var_os("STATIC_DIR").map(PathBuf::from),
            session_timeout: session_timeout(session_timeout_hours),
        }
    }
}

/// Idle time after which a session is dropped. Absurd hour counts clamp instead of overflowing.
fn session_timeout(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_session_timeout_hours() -> u64 {
    12
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// What the schedule screen needs: state, working pairings, conflicts, enabled actions.
#[derive(Serialize)]
struct ScheduleView<'a> {
    league_id: LeagueId,
    state: WeekState,
    candidate: Option<&'a CandidateWeek>,
    conflicts: &'a [Conflict],
    can_reset: bool,
    can_confirm: bool,
}

impl<'a> ScheduleView<'a> {
    fn of(session: &'a WeekSession) -> Self {
        Self {
            league_id: session.league_id,
            state: session.state,
            candidate: session.candidate.as_ref(),
            conflicts: &session.conflicts,
            can_reset: session.can_reset(),
            can_confirm: session.can_confirm(),
        }
    }
}

#[derive(Deserialize)]
struct CreateTeamBody {
    name: String,
}

#[derive(Deserialize)]
struct CreateLeagueBody {
    name: String,
    start_date: NaiveDate,
    #[serde(default)]
    team_ids: Vec<TeamId>,
}

#[derive(Deserialize)]
struct SetTeamsBody {
    team_ids: Vec<TeamId>,
}

#[derive(Deserialize)]
struct EditPairingBody {
    slot: Slot,
    /// None clears the slot.
    team_id: Option<TeamId>,
}

#[derive(Deserialize)]
struct ConfirmBody {
    /// Second confirmation required when pairings conflict.
    #[serde(default)]
    acknowledge_conflicts: bool,
}

/// Path segment: league id (e.g. /api/leagues/{id})
#[derive(Deserialize)]
struct LeaguePath {
    id: LeagueId,
}

/// Path segments: league id and week number (e.g. /api/leagues/{id}/weeks/{week})
#[derive(Deserialize)]
struct LeagueWeekPath {
    id: LeagueId,
    week: u32,
}

/// Path segments: league id and pairing index (e.g. /api/leagues/{id}/schedule/pairings/{index})
#[derive(Deserialize)]
struct PairingPath {
    id: LeagueId,
    index: usize,
}

fn store_error_response(e: &StoreError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        StoreError::NotFound { .. } => HttpResponse::NotFound().json(body),
        StoreError::Rejected(_) => HttpResponse::BadRequest().json(body),
        StoreError::Unavailable(_) => HttpResponse::BadGateway().json(body),
    }
}

fn scheduling_error_response(e: &SchedulingError) -> HttpResponse {
    match e {
        SchedulingError::UnacknowledgedConflicts { conflicts } => HttpResponse::Conflict().json(
            serde_json::json!({ "error": e.to_string(), "conflicts": conflicts }),
        ),
        SchedulingError::Persistence(StoreError::NotFound { .. }) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": e.to_string() }))
        }
        SchedulingError::Persistence(_) => {
            HttpResponse::BadGateway().json(serde_json::json!({ "error": e.to_string() }))
        }
        _ => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "league-pairing-web",
    })
}

#[get("/api/teams")]
async fn api_list_teams(store: Store) -> HttpResponse {
    HttpResponse::Ok().json(store.list_teams().await)
}

#[post("/api/teams")]
async fn api_create_team(store: Store, body: Json<CreateTeamBody>) -> HttpResponse {
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Team name is required" }));
    }
    match store.create_team(name).await {
        Ok(team) => HttpResponse::Ok().json(team),
        Err(e) => store_error_response(&e),
    }
}

#[get("/api/leagues")]
async fn api_list_leagues(store: Store) -> HttpResponse {
    HttpResponse::Ok().json(store.list_leagues().await)
}

#[post("/api/leagues")]
async fn api_create_league(store: Store, body: Json<CreateLeagueBody>) -> HttpResponse {
    let body = body.into_inner();
    match store.create_league(body.name.trim(), body.start_date, body.team_ids).await {
        Ok(league) => HttpResponse::Ok().json(league),
        Err(e) => store_error_response(&e),
    }
}

/// League with its resolved team roster.
#[get("/api/leagues/{id}")]
async fn api_get_league(store: Store, path: Path<LeaguePath>) -> HttpResponse {
    let league = match store.get_league(path.id).await {
        Ok(l) => l,
        Err(e) => return store_error_response(&e),
    };
    match store.get_roster(path.id).await {
        Ok(teams) => HttpResponse::Ok().json(serde_json::json!({ "league": league, "teams": teams })),
        Err(e) => store_error_response(&e),
    }
}

#[put("/api/leagues/{id}/teams")]
async fn api_set_league_teams(store: Store, path: Path<LeaguePath>, body: Json<SetTeamsBody>) -> HttpResponse {
    match store.set_league_teams(path.id, body.into_inner().team_ids).await {
        Ok(league) => HttpResponse::Ok().json(league),
        Err(e) => store_error_response(&e),
    }
}

/// Weeks that have matches, plus the next week that would be generated.
#[get("/api/leagues/{id}/weeks")]
async fn api_list_weeks(store: Store, path: Path<LeaguePath>) -> HttpResponse {
    let weeks = match store.available_weeks(path.id).await {
        Ok(w) => w,
        Err(e) => return store_error_response(&e),
    };
    match store.get_match_history(path.id).await {
        Ok(history) => HttpResponse::Ok().json(serde_json::json!({
            "weeks": weeks,
            "next_week_number": next_week_number(&history),
        })),
        Err(e) => store_error_response(&e),
    }
}

#[get("/api/leagues/{id}/weeks/{week}/matches")]
async fn api_week_matches(store: Store, path: Path<LeagueWeekPath>) -> HttpResponse {
    match store.matches_for_week(path.id, path.week).await {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => store_error_response(&e),
    }
}

/// Delete all matches of a week. The next generated week is recomputed from what remains.
#[delete("/api/leagues/{id}/weeks/{week}")]
async fn api_delete_week(store: Store, path: Path<LeagueWeekPath>) -> HttpResponse {
    match store.delete_week(path.id, path.week).await {
        Ok(removed) => HttpResponse::Ok().json(serde_json::json!({ "removed": removed })),
        Err(e) => store_error_response(&e),
    }
}

/// Current scheduling session for the league (created Uninitialized if absent).
#[get("/api/leagues/{id}/schedule")]
async fn api_get_schedule(sessions: Sessions, store: Store, path: Path<LeaguePath>) -> HttpResponse {
    if let Err(e) = store.get_league(path.id).await {
        return store_error_response(&e);
    }
    let mut g = match sessions.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = g.entry(path.id).or_insert_with(|| SessionEntry::new(path.id));
    entry.last_activity = Instant::now();
    HttpResponse::Ok().json(ScheduleView::of(&entry.session))
}

/// Generate or regenerate the candidate week from the league's current roster.
#[post("/api/leagues/{id}/schedule/generate")]
async fn api_generate_schedule(sessions: Sessions, store: Store, path: Path<LeaguePath>) -> HttpResponse {
    let inputs = match load_week_inputs(store.get_ref(), path.id).await {
        Ok(i) => i,
        Err(e) => return scheduling_error_response(&e),
    };
    let mut g = match sessions.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = g.entry(path.id).or_insert_with(|| SessionEntry::new(path.id));
    entry.last_activity = Instant::now();
    let mut rng = rand::thread_rng();
    if let Err(e) = propose_week(&mut entry.session, inputs.roster, inputs.week_number, &mut rng) {
        return scheduling_error_response(&e);
    }
    HttpResponse::Ok().json(ScheduleView::of(&entry.session))
}

/// Manually set (or clear) one side of a pairing.
#[put("/api/leagues/{id}/schedule/pairings/{index}")]
async fn api_edit_pairing(sessions: Sessions, path: Path<PairingPath>, body: Json<EditPairingBody>) -> HttpResponse {
    let mut g = match sessions.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return scheduling_error_response(&SchedulingError::NoCandidateWeek),
    };
    entry.last_activity = Instant::now();
    match edit_pairing(&mut entry.session, path.index, body.slot, body.team_id) {
        Ok(()) => HttpResponse::Ok().json(ScheduleView::of(&entry.session)),
        Err(e) => scheduling_error_response(&e),
    }
}

/// Restore the last generated pairings, dropping manual changes.
#[post("/api/leagues/{id}/schedule/reset")]
async fn api_reset_schedule(sessions: Sessions, path: Path<LeaguePath>) -> HttpResponse {
    let mut g = match sessions.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return scheduling_error_response(&SchedulingError::NoCandidateWeek),
    };
    entry.last_activity = Instant::now();
    match reset_edits(&mut entry.session) {
        Ok(()) => HttpResponse::Ok().json(ScheduleView::of(&entry.session)),
        Err(e) => scheduling_error_response(&e),
    }
}

/// Discard the candidate week without saving.
#[post("/api/leagues/{id}/schedule/discard")]
async fn api_discard_schedule(sessions: Sessions, path: Path<LeaguePath>) -> HttpResponse {
    let mut g = match sessions.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return scheduling_error_response(&SchedulingError::NoCandidateWeek),
    };
    entry.last_activity = Instant::now();
    if let Err(e) = discard_week(&mut entry.session).and_then(|()| complete_session(&mut entry.session)) {
        return scheduling_error_response(&e);
    }
    HttpResponse::Ok().json(ScheduleView::of(&entry.session))
}

/// Save the candidate week as matches.
///
/// The session is Committing while the store write is in flight, which rejects edits,
/// regeneration and a second confirm. A store failure leaves the candidate for retry.
#[post("/api/leagues/{id}/schedule/confirm")]
async fn api_confirm_schedule(
    sessions: Sessions,
    store: Store,
    path: Path<LeaguePath>,
    body: Option<Json<ConfirmBody>>,
) -> HttpResponse {
    let acknowledge_conflicts = body.as_ref().is_some_and(|b| b.acknowledge_conflicts);
    let league = match store.get_league(path.id).await {
        Ok(l) => l,
        Err(e) => return store_error_response(&e),
    };
    let week_number = match store.get_match_history(path.id).await {
        Ok(history) => next_week_number(&history),
        Err(e) => return store_error_response(&e),
    };

    let requests = {
        let mut g = match sessions.write() {
            Ok(guard) => guard,
            Err(_) => return HttpResponse::InternalServerError().body("lock error"),
        };
        let entry = match g.get_mut(&path.id) {
            Some(e) => e,
            None => return scheduling_error_response(&SchedulingError::NoCandidateWeek),
        };
        entry.last_activity = Instant::now();
        match begin_commit(&mut entry.session, acknowledge_conflicts, league.start_date, week_number) {
            Ok(r) => r,
            Err(e) => return scheduling_error_response(&e),
        }
    };

    // The store write and its bookkeeping run in their own task so a dropped request
    // cannot leave the session Committing.
    let league_id = path.id;
    let commit = actix_web::rt::spawn(async move {
        let result = store.commit_matches(league_id, week_number, &requests).await;
        let Ok(mut g) = sessions.write() else {
            return None;
        };
        let entry = g.entry(league_id).or_insert_with(|| SessionEntry::new(league_id));
        entry.last_activity = Instant::now();
        Some(
            finish_commit(&mut entry.session, result)
                .and_then(|created| complete_session(&mut entry.session).map(|()| created)),
        )
    });
    match commit.await {
        Ok(Some(Ok(created))) => HttpResponse::Ok().json(created),
        Ok(Some(Err(e))) => scheduling_error_response(&e),
        Ok(None) => HttpResponse::InternalServerError().body("lock error"),
        Err(e) => {
            log::error!("League {}: commit task failed: {}", league_id, e);
            HttpResponse::InternalServerError().body("commit task failed")
        }
    }
}

/// Load teams from the configured CSV file into the store.
async fn seed_teams(store: &MemoryStore, path: &std::path::Path) -> std::io::Result<()> {
    let file = std::fs::File::open(path)?;
    let teams = read_teams_csv(file)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let count = teams.len();
    for team in teams {
        store.upsert_team(team).await;
    }
    log::info!("Seeded {} team(s) from {}", count, path.display());
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let store = Data::new(MemoryStore::new());
    if let Some(path) = &config.teams_csv {
        seed_teams(store.get_ref(), path).await?;
    }

    let bind = (config.host.as_str(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let sessions = Data::new(RwLock::new(HashMap::<LeagueId, SessionEntry>::new()));

    // Background task: every 30 minutes, drop idle sessions. In-flight commits are kept.
    let sessions_cleanup = sessions.clone();
    let session_timeout = config.session_timeout;
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match sessions_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| {
                entry.session.state == WeekState::Committing
                    || entry.last_activity.elapsed() < session_timeout
            });
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive scheduling session(s)", removed);
            }
        }
    });

    let static_dir = config.static_dir.clone();
    HttpServer::new(move || {
        let app = App::new()
            .app_data(sessions.clone())
            .app_data(store.clone())
            .service(api_health)
            .service(api_list_teams)
            .service(api_create_team)
            .service(api_list_leagues)
            .service(api_create_league)
            .service(api_get_league)
            .service(api_set_league_teams)
            .service(api_list_weeks)
            .service(api_week_matches)
            .service(api_delete_week)
            .service(api_get_schedule)
            .service(api_generate_schedule)
            .service(api_edit_pairing)
            .service(api_reset_schedule)
            .service(api_discard_schedule)
            .service(api_confirm_schedule);
        match &static_dir {
            Some(dir) => app.service(Files::new("/", dir.clone()).index_file("index.html")),
            None => app,
        }
    })
    .bind(bind)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};

    #[::core::prelude::v1::test]
    fn session_timeout_converts_hours() {
        assert_eq!(session_timeout(12), Duration::from_secs(12 * 3600));
    }

    #[::core::prelude::v1::test]
    fn session_timeout_clamps_huge_hour_counts() {
        assert_eq!(session_timeout(u64::MAX), Duration::from_secs(u64::MAX));
    }

    #[actix_web::test]
    async fn schedule_of_unknown_league_creates_no_session() {
        let sessions = Data::new(RwLock::new(HashMap::<LeagueId, SessionEntry>::new()));
        let store = Data::new(MemoryStore::new());
        let app = test::init_service(
            App::new()
                .app_data(sessions.clone())
                .app_data(store.clone())
                .service(api_get_schedule),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/leagues/42/schedule").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(sessions.read().unwrap().is_empty());

        let league = store
            .create_league("Tuesday Night", NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), vec![])
            .await
            .unwrap();
        let req = test::TestRequest::get()
            .uri(&format!("/api/leagues/{}/schedule", league.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(sessions.read().unwrap().contains_key(&league.id));
    }
}
