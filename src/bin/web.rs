//! Single binary web server: bracket engine behind a REST API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! MAP_CATALOG may point to a JSON file ({"games": {...}, "default_maps": [...]})
//! to replace the built-in map catalog.

use actix_web::{
    get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use swiss_bracket_web::{
    approve_match_result, cancel_match, create_bracket, create_match_dispute,
    generate_next_round, resolve_dispute, start_match, start_playoffs, submit_match_result,
    BracketError, ByePolicy, MapCatalog, MapResult, MatchId, ParticipantId, ParticipantKind,
    SwissConfig, TournamentBracket, TournamentId,
};
use uuid::Uuid;

/// Per-bracket entry: bracket data + last activity time (for auto-cleanup).
struct BracketEntry {
    bracket: TournamentBracket,
    last_activity: Instant,
}

/// In-memory state: many brackets by tournament id. All writes to one bracket
/// go through the write lock, which serializes result approvals and round
/// generation against the same aggregate.
type AppState = Data<RwLock<HashMap<TournamentId, BracketEntry>>>;

/// Inactivity threshold: brackets not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateBracketBody {
    game: String,
    participants: Vec<ParticipantKind>,
    #[serde(default = "default_qualification_spots")]
    qualification_spots: usize,
    #[serde(default = "default_elimination_threshold")]
    elimination_threshold: u32,
    #[serde(default)]
    bye_policy: ByePolicy,
}

fn default_qualification_spots() -> usize {
    8
}

fn default_elimination_threshold() -> u32 {
    3
}

#[derive(Deserialize)]
struct SubmitResultBody {
    reported_by: ParticipantId,
    results: Vec<MapResult>,
    #[serde(default)]
    screenshots: Vec<String>,
}

#[derive(Deserialize)]
struct CancelMatchBody {
    reason: String,
}

#[derive(Deserialize)]
struct CreateDisputeBody {
    reported_by: ParticipantId,
    reason: String,
    description: String,
    #[serde(default)]
    evidence: Vec<String>,
}

#[derive(Deserialize)]
struct ResolveDisputeBody {
    upheld: bool,
    admin_response: String,
}

/// Path segment: tournament id (e.g. /api/brackets/{id})
#[derive(Deserialize)]
struct BracketPath {
    id: TournamentId,
}

/// Path segments: tournament id and match id.
#[derive(Deserialize)]
struct BracketMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

/// Path segments: tournament id and report/dispute id.
#[derive(Deserialize)]
struct BracketItemPath {
    id: TournamentId,
    item_id: Uuid,
}

/// Engine errors: not-found is a distinct kind from precondition/validation.
fn error_response(e: &BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    if e.is_not_found() {
        HttpResponse::NotFound().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    }
}

fn no_bracket() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No bracket" }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "swiss-bracket-web",
    })
}

/// Create a new bracket (returns it with id; client stores id for subsequent requests).
#[post("/api/brackets")]
async fn api_create_bracket(
    state: AppState,
    catalog: Data<MapCatalog>,
    body: Json<CreateBracketBody>,
) -> HttpResponse {
    let config = SwissConfig {
        qualification_spots: body.qualification_spots,
        elimination_threshold: body.elimination_threshold,
        bye_policy: body.bye_policy,
    };
    let tournament_id = Uuid::new_v4();
    let body = body.into_inner();
    let bracket = match create_bracket(tournament_id, body.game, body.participants, config, &catalog)
    {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    g.insert(
        tournament_id,
        BracketEntry {
            bracket,
            last_activity: Instant::now(),
        },
    );
    HttpResponse::Ok().json(&g.get(&tournament_id).unwrap().bracket)
}

/// Get a bracket by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/brackets/{id}")]
async fn api_get_bracket(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.bracket)
        }
        None => no_bracket(),
    }
}

/// Snapshot of the standings (read lock only; display concern).
#[get("/api/brackets/{id}/standings")]
async fn api_get_standings(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get(&path.id) {
        Some(entry) => {
            let mut standings: Vec<_> = entry.bracket.standings.values().cloned().collect();
            standings.sort_by(swiss_bracket_web::logic::compare_rank);
            HttpResponse::Ok().json(standings)
        }
        None => no_bracket(),
    }
}

/// Generate the next Swiss round (fails while the current round is unfinished).
#[post("/api/brackets/{id}/rounds")]
async fn api_generate_next_round(
    state: AppState,
    catalog: Data<MapCatalog>,
    path: Path<BracketPath>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    let b = &mut entry.bracket;
    match generate_next_round(b, &catalog) {
        Ok(ids) => {
            let matches: Vec<_> = ids.iter().filter_map(|id| b.get_match(*id)).collect();
            HttpResponse::Ok().json(matches)
        }
        Err(e) => error_response(&e),
    }
}

/// Transition the bracket into the playoff phase.
#[post("/api/brackets/{id}/playoffs")]
async fn api_start_playoffs(
    state: AppState,
    catalog: Data<MapCatalog>,
    path: Path<BracketPath>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    let b = &mut entry.bracket;
    match start_playoffs(b, &catalog) {
        Ok(_) => HttpResponse::Ok().json(&*b),
        Err(e) => error_response(&e),
    }
}

/// Mark a scheduled match as started.
#[post("/api/brackets/{id}/matches/{match_id}/start")]
async fn api_start_match(state: AppState, path: Path<BracketMatchPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    let b = &mut entry.bracket;
    match start_match(b, path.match_id) {
        Ok(()) => HttpResponse::Ok().json(b.get_match(path.match_id)),
        Err(e) => error_response(&e),
    }
}

/// Cancel a non-terminal match (requires a reason).
#[post("/api/brackets/{id}/matches/{match_id}/cancel")]
async fn api_cancel_match(
    state: AppState,
    path: Path<BracketMatchPath>,
    body: Json<CancelMatchBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    let b = &mut entry.bracket;
    match cancel_match(b, path.match_id, body.reason.clone()) {
        Ok(()) => HttpResponse::Ok().json(b.get_match(path.match_id)),
        Err(e) => error_response(&e),
    }
}

/// Submit a proposed result for a match (creates a pending report).
#[post("/api/brackets/{id}/matches/{match_id}/report")]
async fn api_submit_result(
    state: AppState,
    path: Path<BracketMatchPath>,
    body: Json<SubmitResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    let b = &mut entry.bracket;
    let body = body.into_inner();
    match submit_match_result(b, path.match_id, body.reported_by, body.results, body.screenshots) {
        Ok(report_id) => HttpResponse::Ok().json(b.get_report(report_id)),
        Err(e) => error_response(&e),
    }
}

/// Approve a pending report: completes the match and updates standings.
#[post("/api/brackets/{id}/reports/{item_id}/approve")]
async fn api_approve_result(state: AppState, path: Path<BracketItemPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    let b = &mut entry.bracket;
    match approve_match_result(b, path.item_id) {
        Ok(()) => HttpResponse::Ok().json(&*b),
        Err(e) => error_response(&e),
    }
}

/// List reports for a bracket.
#[get("/api/brackets/{id}/reports")]
async fn api_list_reports(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get(&path.id) {
        Some(entry) => HttpResponse::Ok().json(&entry.bracket.reports),
        None => no_bracket(),
    }
}

/// File a dispute against a match.
#[post("/api/brackets/{id}/matches/{match_id}/disputes")]
async fn api_create_dispute(
    state: AppState,
    path: Path<BracketMatchPath>,
    body: Json<CreateDisputeBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    let b = &mut entry.bracket;
    let body = body.into_inner();
    match create_match_dispute(
        b,
        path.match_id,
        body.reported_by,
        body.reason,
        body.description,
        body.evidence,
    ) {
        Ok(dispute_id) => {
            HttpResponse::Ok().json(b.disputes.iter().find(|d| d.id == dispute_id))
        }
        Err(e) => error_response(&e),
    }
}

/// Record an administrative ruling on a dispute.
#[post("/api/brackets/{id}/disputes/{item_id}/resolve")]
async fn api_resolve_dispute(
    state: AppState,
    path: Path<BracketItemPath>,
    body: Json<ResolveDisputeBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return no_bracket(),
    };
    entry.last_activity = Instant::now();
    let b = &mut entry.bracket;
    match resolve_dispute(b, path.item_id, body.upheld, body.admin_response.clone()) {
        Ok(()) => HttpResponse::Ok().json(b.disputes.iter().find(|d| d.id == path.item_id)),
        Err(e) => error_response(&e),
    }
}

/// List disputes for a bracket.
#[get("/api/brackets/{id}/disputes")]
async fn api_list_disputes(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get(&path.id) {
        Some(entry) => HttpResponse::Ok().json(&entry.bracket.disputes),
        None => no_bracket(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Load the map catalog from MAP_CATALOG (JSON file) if set, else defaults.
fn load_catalog() -> MapCatalog {
    let path = match std::env::var("MAP_CATALOG") {
        Ok(p) => p,
        Err(_) => return MapCatalog::with_defaults(),
    };
    #[derive(Deserialize)]
    struct CatalogFile {
        games: HashMap<String, Vec<String>>,
        default_maps: Vec<String>,
    }
    match std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|s| serde_json::from_str::<CatalogFile>(&s).map_err(|e| e.to_string()))
    {
        Ok(f) => {
            log::info!("Loaded map catalog from {}", path);
            MapCatalog::new(f.games, f.default_maps)
        }
        Err(e) => {
            log::warn!("Failed to load map catalog from {}: {}; using defaults", path, e);
            MapCatalog::with_defaults()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<TournamentId, BracketEntry>::new()));
    let catalog = Data::new(load_catalog());

    // Background task: every 30 minutes, remove brackets inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive bracket(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(catalog.clone())
            .service(api_health)
            .service(api_create_bracket)
            .service(api_get_bracket)
            .service(api_get_standings)
            .service(api_generate_next_round)
            .service(api_start_playoffs)
            .service(api_start_match)
            .service(api_cancel_match)
            .service(api_submit_result)
            .service(api_approve_result)
            .service(api_list_reports)
            .service(api_create_dispute)
            .service(api_resolve_dispute)
            .service(api_list_disputes)
    })
    .bind(bind)?
    .run()
    .await
}
