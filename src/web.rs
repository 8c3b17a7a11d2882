use actix_files::Files;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::booking::events::calendar_events;
use crate::booking::occupancy::{slot_occupancy, FillBand, SlotOccupancy};
use crate::booking::scheduler::{
    apply_practice, apply_tournament, reapply_practices, reapply_tournaments, ApplyOutcome,
    Horizon,
};
use crate::booking::slot::{slot_start_hour, Court, HOURS_PER_DAY};
use crate::booking::store::{BookingStore, SlotValue};
use crate::config::DataFiles;
use crate::display::french_day_title;
use crate::error::AppError;
use crate::roster::{
    append_practice, append_tournament, coach_names, load_members, load_practices,
    load_tournaments, staffer_names, PracticeDef, TournamentDef,
};

pub struct AppState {
    pub files: DataFiles,
    pub horizon: Horizon,
    // Serializes load-modify-save cycles within this process; two processes
    // racing are caught by the store's revision check instead.
    pub store_lock: Mutex<()>,
}

// Translates an AppError into the JSON error shape the pages expect.
fn error_response(e: &AppError) -> HttpResponse {
    let body = serde_json::json!({"success": false, "error": e.to_string()});
    match e {
        AppError::StaleStore { .. } => HttpResponse::Conflict().json(body),
        AppError::UnknownWeekday(_)
        | AppError::InvalidTime(_)
        | AppError::InvalidHourRange { .. }
        | AppError::InvalidDate(_)
        | AppError::SlotBlocked { .. }
        | AppError::NoOpenCourt { .. }
        | AppError::Validation(_) => HttpResponse::BadRequest().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

fn parse_day(raw: &str) -> std::result::Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| AppError::InvalidDate(raw.to_string()))
}

/// Per-court state sent to the day page.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CourtView {
    Free,
    Staffer { name: String },
    Practice { coach: String, gender: String, level: String },
    Tournament { level: String, gender: String },
}

impl From<SlotValue> for CourtView {
    fn from(value: SlotValue) -> CourtView {
        match value {
            SlotValue::Free => CourtView::Free,
            SlotValue::Staffer(name) => CourtView::Staffer { name },
            SlotValue::Practice {
                coach,
                gender,
                level,
            } => CourtView::Practice {
                coach,
                gender,
                level,
            },
            SlotValue::Tournament { level, gender } => CourtView::Tournament { level, gender },
        }
    }
}

#[derive(Serialize)]
pub struct DaySlot {
    hour: u8,
    start: String,
    end: String,
    court1: CourtView,
    court2: CourtView,
    players: Vec<String>,
    capacity_override: Option<u32>,
    effective_capacity: u32,
    occupancy: Option<SlotOccupancy>,
    band: Option<FillBand>,
    emoji: Option<&'static str>,
}

#[derive(Serialize)]
pub struct DayResponse {
    date: String,
    title: String,
    slots: Vec<DaySlot>,
}

#[derive(Deserialize)]
pub struct CalendarQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct AssignRequest {
    hour: u8,
    court: u8,
    name: String,
}

#[derive(Deserialize)]
pub struct EnrollRequest {
    hour: u8,
    capacity: Option<u32>,
    players: Vec<String>,
}

#[derive(Deserialize)]
pub struct PracticeRequest {
    weekday: String,
    start: String,
    end: String,
    coach: String,
    level: String,
    gender: String,
    court1: bool,
    court2: bool,
}

#[derive(Deserialize)]
pub struct TournamentRequest {
    date: NaiveDate,
    start: String,
    end: String,
    level: String,
    gender: String,
    court1: bool,
    court2: bool,
}

#[derive(Serialize)]
pub struct MemberResponse {
    name: String,
    staffer: bool,
    coach: bool,
}

// Calendar events over the configured horizon (or an explicit from/to).
async fn get_calendar(
    query: web::Query<CalendarQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let horizon = match (query.from, query.to) {
        (None, None) => state.horizon,
        (from, to) => {
            let start = from.unwrap_or(state.horizon.start);
            let end = to.unwrap_or(state.horizon.end);
            match Horizon::new(start, end) {
                Ok(h) => h,
                Err(e) => return Ok(error_response(&e)),
            }
        }
    };
    let store = match BookingStore::load(&state.files.bookings()) {
        Ok(s) => s,
        Err(e) => return Ok(error_response(&e)),
    };
    Ok(HttpResponse::Ok().json(calendar_events(&store, &horizon)))
}

// Full slot grid of one day, for the day page.
async fn get_day(day: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let date = match parse_day(&day) {
        Ok(d) => d,
        Err(e) => return Ok(error_response(&e)),
    };
    let store = match BookingStore::load(&state.files.bookings()) {
        Ok(s) => s,
        Err(e) => return Ok(error_response(&e)),
    };

    let mut slots = Vec::with_capacity(HOURS_PER_DAY as usize);
    for hour in 0..HOURS_PER_DAY {
        let start = slot_start_hour(hour);
        let occupancy = slot_occupancy(&store, date, hour);
        let band = occupancy
            .as_ref()
            .map(|o| FillBand::from_percentage(o.percentage));
        slots.push(DaySlot {
            hour,
            start: format!("{:02}:00", start),
            end: format!("{:02}:00", start + 1),
            court1: store.court(date, hour, Court::One).into(),
            court2: store.court(date, hour, Court::Two).into(),
            players: store.players(date, hour),
            capacity_override: store.capacity_override(date, hour),
            effective_capacity: store.effective_capacity(date, hour),
            occupancy,
            band,
            emoji: band.map(FillBand::emoji),
        });
    }

    Ok(HttpResponse::Ok().json(DayResponse {
        date: date.to_string(),
        title: french_day_title(date),
        slots,
    }))
}

// Staffer assignment for one court of one slot. Only members holding the
// staffer role may be responsible for a court.
async fn assign_staffer(
    day: web::Path<String>,
    req: web::Json<AssignRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let date = match parse_day(&day) {
        Ok(d) => d,
        Err(e) => return Ok(error_response(&e)),
    };
    let court = match Court::from_number(req.court) {
        Some(c) if req.hour < HOURS_PER_DAY => c,
        _ => {
            return Ok(error_response(&AppError::Validation(format!(
                "invalid slot coordinate: hour {} court {}",
                req.hour, req.court
            ))))
        }
    };
    let name = req.name.trim();
    if !name.is_empty() {
        let members = match load_members(&state.files.members()) {
            Ok(m) => m,
            Err(e) => return Ok(error_response(&e)),
        };
        if !staffer_names(&members).iter().any(|s| s.as_str() == name) {
            return Ok(error_response(&AppError::Validation(format!(
                "{} is not a staffer",
                name
            ))));
        }
    }

    let _guard = state.store_lock.lock().unwrap();
    let mut store = match BookingStore::load(&state.files.bookings()) {
        Ok(s) => s,
        Err(e) => return Ok(error_response(&e)),
    };
    if let Err(e) = store.assign_staffer(date, req.hour, court, name) {
        return Ok(error_response(&e));
    }
    if let Err(e) = store.save(&state.files.bookings()) {
        return Ok(error_response(&e));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

// Capacity override + enrolled players for one slot.
async fn enroll_players(
    day: web::Path<String>,
    req: web::Json<EnrollRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let date = match parse_day(&day) {
        Ok(d) => d,
        Err(e) => return Ok(error_response(&e)),
    };
    if req.hour >= HOURS_PER_DAY {
        return Ok(error_response(&AppError::Validation(format!(
            "invalid hour index: {}",
            req.hour
        ))));
    }

    let _guard = state.store_lock.lock().unwrap();
    let mut store = match BookingStore::load(&state.files.bookings()) {
        Ok(s) => s,
        Err(e) => return Ok(error_response(&e)),
    };
    if let Some(capacity) = req.capacity {
        store.set_capacity_override(date, req.hour, capacity);
    }
    let kept = match store.enroll_players(date, req.hour, &req.players) {
        Ok(kept) => kept,
        Err(e) => return Ok(error_response(&e)),
    };
    if let Err(e) = store.save(&state.files.bookings()) {
        return Ok(error_response(&e));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "players": kept,
        "effective_capacity": store.effective_capacity(date, req.hour),
    })))
}

async fn get_members(state: web::Data<AppState>) -> Result<HttpResponse> {
    match load_members(&state.files.members()) {
        Ok(members) => {
            let out: Vec<MemberResponse> = members
                .iter()
                .map(|m| MemberResponse {
                    name: m.full_name(),
                    staffer: m.staffer,
                    coach: m.coach,
                })
                .collect();
            Ok(HttpResponse::Ok().json(out))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

async fn get_practices(state: web::Data<AppState>) -> Result<HttpResponse> {
    match load_practices(&state.files.practices()) {
        Ok(defs) => Ok(HttpResponse::Ok().json(defs)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn get_tournaments(state: web::Data<AppState>) -> Result<HttpResponse> {
    match load_tournaments(&state.files.tournaments()) {
        Ok(defs) => Ok(HttpResponse::Ok().json(defs)),
        Err(e) => Ok(error_response(&e)),
    }
}

// Adds a recurring practice: validate the coach, run the two-phase
// scheduler over the horizon, and only on success append the roster row
// and persist the store. Conflicts answer 409 with the offending slots.
async fn add_practice(
    req: web::Json<PracticeRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let members = match load_members(&state.files.members()) {
        Ok(m) => m,
        Err(e) => return Ok(error_response(&e)),
    };
    let coach = req.coach.trim();
    if !coach_names(&members).iter().any(|c| c.as_str() == coach) {
        return Ok(error_response(&AppError::Validation(format!(
            "{} is not a coach",
            coach
        ))));
    }

    let def = PracticeDef {
        weekday: req.weekday.clone(),
        start: req.start.clone(),
        end: req.end.clone(),
        coach: coach.to_string(),
        level: req.level.clone(),
        gender: req.gender.clone(),
        court1: req.court1,
        court2: req.court2,
    };

    let _guard = state.store_lock.lock().unwrap();
    let mut store = match BookingStore::load(&state.files.bookings()) {
        Ok(s) => s,
        Err(e) => return Ok(error_response(&e)),
    };
    match apply_practice(&mut store, &def, &state.horizon) {
        Ok(ApplyOutcome::Applied { slots_written }) => {
            if let Err(e) = append_practice(&state.files.practices(), &def) {
                return Ok(error_response(&e));
            }
            if let Err(e) = store.save(&state.files.bookings()) {
                return Ok(error_response(&e));
            }
            Ok(HttpResponse::Ok()
                .json(serde_json::json!({"success": true, "slots_written": slots_written})))
        }
        Ok(ApplyOutcome::Rejected(conflicts)) => {
            let listed: Vec<String> = conflicts.iter().map(ToString::to_string).collect();
            Ok(HttpResponse::Conflict()
                .json(serde_json::json!({"success": false, "conflicts": listed})))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

// Same protocol for a one-day tournament.
async fn add_tournament(
    req: web::Json<TournamentRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let def = TournamentDef {
        date: req.date,
        start: req.start.clone(),
        end: req.end.clone(),
        level: req.level.clone(),
        gender: req.gender.clone(),
        court1: req.court1,
        court2: req.court2,
    };

    let _guard = state.store_lock.lock().unwrap();
    let mut store = match BookingStore::load(&state.files.bookings()) {
        Ok(s) => s,
        Err(e) => return Ok(error_response(&e)),
    };
    match apply_tournament(&mut store, &def) {
        Ok(ApplyOutcome::Applied { slots_written }) => {
            if let Err(e) = append_tournament(&state.files.tournaments(), &def) {
                return Ok(error_response(&e));
            }
            if let Err(e) = store.save(&state.files.bookings()) {
                return Ok(error_response(&e));
            }
            Ok(HttpResponse::Ok()
                .json(serde_json::json!({"success": true, "slots_written": slots_written})))
        }
        Ok(ApplyOutcome::Rejected(conflicts)) => {
            let listed: Vec<String> = conflicts.iter().map(ToString::to_string).collect();
            Ok(HttpResponse::Conflict()
                .json(serde_json::json!({"success": false, "conflicts": listed})))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

// Re-derives the store from both rosters ("Réappliquer" buttons).
async fn reapply_all(state: web::Data<AppState>) -> Result<HttpResponse> {
    let practices = match load_practices(&state.files.practices()) {
        Ok(p) => p,
        Err(e) => return Ok(error_response(&e)),
    };
    let tournaments = match load_tournaments(&state.files.tournaments()) {
        Ok(t) => t,
        Err(e) => return Ok(error_response(&e)),
    };

    let _guard = state.store_lock.lock().unwrap();
    let mut store = match BookingStore::load(&state.files.bookings()) {
        Ok(s) => s,
        Err(e) => return Ok(error_response(&e)),
    };
    let practice_summary = reapply_practices(&mut store, &practices, &state.horizon);
    let tournament_summary = reapply_tournaments(&mut store, &tournaments);
    if let Err(e) = store.save(&state.files.bookings()) {
        return Ok(error_response(&e));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "practices": practice_summary,
        "tournaments": tournament_summary,
    })))
}

// HTML page handlers
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

async fn planning_page() -> Result<HttpResponse> {
    let html = include_str!("../templates/planning.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub async fn start_server(port: u16, files: DataFiles, horizon: Horizon) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        files,
        horizon,
        store_lock: Mutex::new(()),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .route("/", web::get().to(index))
            .route("/planning", web::get().to(planning_page))
            .route("/api/calendar", web::get().to(get_calendar))
            .route("/api/members", web::get().to(get_members))
            .route("/api/practices", web::get().to(get_practices))
            .route("/api/practices", web::post().to(add_practice))
            .route("/api/tournaments", web::get().to(get_tournaments))
            .route("/api/tournaments", web::post().to(add_tournament))
            .route("/api/reapply", web::post().to(reapply_all))
            .service(web::resource("/api/day/{date}").route(web::get().to(get_day)))
            .route("/api/day/{date}/assign", web::post().to(assign_staffer))
            .route("/api/day/{date}/enroll", web::post().to(enroll_players))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
