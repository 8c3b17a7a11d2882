use chrono::NaiveDate;
use serde::Serialize;

use crate::booking::occupancy::{slot_occupancy, FillBand};
use crate::booking::scheduler::Horizon;
use crate::booking::slot::{slot_start_hour, Court, HOURS_PER_DAY};
use crate::booking::store::{BookingStore, SlotValue};

const PRACTICE_COLOR: &str = "#E9D5FF";
const TOURNAMENT_COLOR: &str = "#FED7AA";
const TEXT_COLOR: &str = "#1f2937";

/// One entry for the reactive calendar widget.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarEvent {
    pub title: String,
    pub start: String,
    pub end: String,
    pub color: String,
    #[serde(rename = "textColor")]
    pub text_color: String,
}

fn local_iso(date: NaiveDate, wall_hour: u8) -> String {
    date.and_hms_opt(wall_hour as u32, 0, 0)
        .expect("grid hours are valid")
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

// Where a block event spans: one court or both at once.
#[derive(Clone, Copy)]
enum Span {
    Both,
    Single(Court),
}

fn block_title(value: &SlotValue, span: Span) -> String {
    match (value, span) {
        (SlotValue::Practice { gender, level, .. }, Span::Both) => {
            format!("🏐 Entrainement {} - {}", gender, level)
        }
        (SlotValue::Practice { gender, level, .. }, Span::Single(court)) => {
            format!("🏐 T{}: {} - {}", court.number(), gender, level)
        }
        (SlotValue::Tournament { level, gender }, Span::Both) => {
            format!("🏆 Tournoi {} - {}", level, gender)
        }
        (SlotValue::Tournament { level, gender }, Span::Single(court)) => {
            format!("🏆 T{}: {} - {}", court.number(), level, gender)
        }
        // Only blocks reach this function.
        _ => String::new(),
    }
}

fn block_event(date: NaiveDate, from: u8, to: u8, value: &SlotValue, span: Span) -> CalendarEvent {
    let color = match value {
        SlotValue::Tournament { .. } => TOURNAMENT_COLOR,
        _ => PRACTICE_COLOR,
    };
    CalendarEvent {
        title: block_title(value, span),
        start: local_iso(date, slot_start_hour(from)),
        end: local_iso(date, slot_start_hour(to)),
        color: color.to_string(),
        text_color: TEXT_COLOR.to_string(),
    }
}

// Consecutive hours (from `start` on) where the court holds exactly `value`.
fn run_length(store: &BookingStore, date: NaiveDate, start: u8, court: Court, value: &SlotValue) -> u8 {
    let mut len = 1;
    for hour in start + 1..HOURS_PER_DAY {
        if store.court(date, hour, court) == *value {
            len += 1;
        } else {
            break;
        }
    }
    len
}

// Same, but both courts must hold `value` for the run to continue.
fn run_length_both(store: &BookingStore, date: NaiveDate, start: u8, value: &SlotValue) -> u8 {
    let mut len = 1;
    for hour in start + 1..HOURS_PER_DAY {
        if store.court(date, hour, Court::One) == *value
            && store.court(date, hour, Court::Two) == *value
        {
            len += 1;
        } else {
            break;
        }
    }
    len
}

/// Expands one day of the store into calendar events: practice/tournament
/// blocks merged over consecutive hours (and over both courts when they
/// hold the identical block), open staffed slots kept hourly and colored by
/// fill band.
pub fn day_events(store: &BookingStore, date: NaiveDate, out: &mut Vec<CalendarEvent>) {
    let mut handled = [[false; HOURS_PER_DAY as usize]; 2];

    for hour in 0..HOURS_PER_DAY {
        let v1 = store.court(date, hour, Court::One);
        let v2 = store.court(date, hour, Court::Two);

        // Identical block on both courts: one merged event.
        if v1.is_block() && v1 == v2 && !handled[0][hour as usize] {
            let len = run_length_both(store, date, hour, &v1);
            for h in hour..hour + len {
                handled[0][h as usize] = true;
                handled[1][h as usize] = true;
            }
            out.push(block_event(date, hour, hour + len, &v1, Span::Both));
            continue;
        }

        for (idx, court) in Court::ALL.into_iter().enumerate() {
            let value = store.court(date, hour, court);
            if value.is_block() && !handled[idx][hour as usize] {
                let len = run_length(store, date, hour, court, &value);
                for h in hour..hour + len {
                    handled[idx][h as usize] = true;
                }
                out.push(block_event(date, hour, hour + len, &value, Span::Single(court)));
            }
        }
        if v1.is_block() || v2.is_block() {
            continue;
        }

        // Open slot: one hourly event titled by its fill counts.
        if let Some(occ) = slot_occupancy(store, date, hour) {
            let band = FillBand::from_percentage(occ.percentage);
            out.push(CalendarEvent {
                title: format!("({}/{})", occ.occupied, occ.capacity),
                start: local_iso(date, slot_start_hour(hour)),
                end: local_iso(date, slot_start_hour(hour) + 1),
                color: band.color().to_string(),
                text_color: TEXT_COLOR.to_string(),
            });
        }
    }
}

/// Events for every day of the horizon, in date order.
pub fn calendar_events(store: &BookingStore, horizon: &Horizon) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    for date in horizon.days() {
        day_events(store, date, &mut events);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn practice() -> SlotValue {
        SlotValue::parse("ENTRAINEMENT|Alice Martin|Mixte|Avancé")
    }

    #[test]
    fn consecutive_block_hours_merge_into_one_event() {
        let mut store = BookingStore::new();
        let d = date(2026, 3, 9);
        for hour in 10..12 {
            store.set_court(d, hour, Court::One, practice());
        }
        let mut events = Vec::new();
        day_events(&store, d, &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "🏐 T1: Mixte - Avancé");
        assert_eq!(events[0].start, "2026-03-09T18:00:00");
        assert_eq!(events[0].end, "2026-03-09T20:00:00");
        assert_eq!(events[0].color, PRACTICE_COLOR);
    }

    #[test]
    fn identical_block_on_both_courts_is_a_single_event() {
        let mut store = BookingStore::new();
        let d = date(2026, 3, 9);
        let tournament = SlotValue::parse("TOURNOI|S1|Mixte");
        for hour in 1..10 {
            store.set_court(d, hour, Court::One, tournament.clone());
            store.set_court(d, hour, Court::Two, tournament.clone());
        }
        let mut events = Vec::new();
        day_events(&store, d, &mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "🏆 Tournoi S1 - Mixte");
        assert_eq!(events[0].start, "2026-03-09T09:00:00");
        assert_eq!(events[0].end, "2026-03-09T18:00:00");
        assert_eq!(events[0].color, TOURNAMENT_COLOR);
    }

    #[test]
    fn open_slots_stay_hourly_and_band_colored() {
        let mut store = BookingStore::new();
        let d = date(2026, 3, 9);
        store.assign_staffer(d, 2, Court::One, "Jean").unwrap();
        store.assign_staffer(d, 3, Court::One, "Jean").unwrap();
        let mut events = Vec::new();
        day_events(&store, d, &mut events);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "(1/8)");
        // 1/8 = 12.5% occupancy: lowest band.
        assert_eq!(events[0].color, FillBand::Low.color());
        assert_eq!(events[0].start, "2026-03-09T10:00:00");
        assert_eq!(events[0].end, "2026-03-09T11:00:00");
    }
}
