use std::fmt;
use std::ops::Range;

use chrono::{Datelike, NaiveDate};
use log::warn;
use serde::Serialize;

use crate::booking::slot::{hour_indices, slot_start_hour, weekday_from_french, Court};
use crate::booking::store::{BookingStore, SlotValue};
use crate::error::{AppError, AppResult};
use crate::roster::{PracticeDef, TournamentDef};

/// Inclusive date range a recurring definition is expanded over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Horizon {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Horizon> {
        if end < start {
            return Err(AppError::Validation(format!(
                "horizon ends before it starts: {} > {}",
                start, end
            )));
        }
        Ok(Horizon { start, end })
    }

    /// Whole-year horizon, Jan 1 through Dec 31.
    pub fn year(year: i32) -> Horizon {
        Horizon {
            start: NaiveDate::from_ymd_opt(year, 1, 1).expect("valid date"),
            end: NaiveDate::from_ymd_opt(year, 12, 31).expect("valid date"),
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// One already-occupied slot that prevents a definition from applying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConflict {
    pub date: NaiveDate,
    pub court: Court,
    pub hour: u8,
}

impl fmt::Display for SlotConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} - Terrain {} - {}h",
            self.date.day(),
            self.date.month(),
            self.date.year(),
            self.court.number(),
            slot_start_hour(self.hour)
        )
    }
}

/// Result of a two-phase scheduling attempt: either every affected slot was
/// written, or none was.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Applied { slots_written: usize },
    Rejected(Vec<SlotConflict>),
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

fn enabled_courts(court1: bool, court2: bool) -> AppResult<Vec<Court>> {
    let courts: Vec<Court> = [(Court::One, court1), (Court::Two, court2)]
        .into_iter()
        .filter_map(|(c, enabled)| enabled.then_some(c))
        .collect();
    if courts.is_empty() {
        return Err(AppError::Validation(
            "at least one court must be selected".to_string(),
        ));
    }
    Ok(courts)
}

// The scan-then-commit core shared by practices and tournaments. The scan
// walks every affected key first; a single occupied key rejects the whole
// request, so the store is never left partially updated.
fn apply_block(
    store: &mut BookingStore,
    dates: &[NaiveDate],
    hours: Range<u8>,
    courts: &[Court],
    value: SlotValue,
) -> ApplyOutcome {
    let mut conflicts = Vec::new();
    for &date in dates {
        for hour in hours.clone() {
            for &court in courts {
                if store.is_occupied(date, hour, court) {
                    conflicts.push(SlotConflict { date, court, hour });
                }
            }
        }
    }
    if !conflicts.is_empty() {
        return ApplyOutcome::Rejected(conflicts);
    }

    let mut slots_written = 0;
    for &date in dates {
        for hour in hours.clone() {
            for &court in courts {
                store.set_court(date, hour, court, value.clone());
                slots_written += 1;
            }
        }
    }
    ApplyOutcome::Applied { slots_written }
}

/// Expands a weekly practice over the horizon and blocks every matching
/// slot, all-or-nothing. The caller persists the store afterwards.
pub fn apply_practice(
    store: &mut BookingStore,
    def: &PracticeDef,
    horizon: &Horizon,
) -> AppResult<ApplyOutcome> {
    let weekday = weekday_from_french(&def.weekday)?;
    let hours = hour_indices(&def.start, &def.end)?;
    let courts = enabled_courts(def.court1, def.court2)?;
    if def.coach.trim().is_empty() {
        return Err(AppError::Validation("a coach is required".to_string()));
    }
    let dates: Vec<NaiveDate> = horizon.days().filter(|d| d.weekday() == weekday).collect();
    let value = SlotValue::Practice {
        coach: def.coach.clone(),
        gender: def.gender.clone(),
        level: def.level.clone(),
    };
    Ok(apply_block(store, &dates, hours, &courts, value))
}

/// Blocks the slots of a one-day tournament, all-or-nothing.
pub fn apply_tournament(store: &mut BookingStore, def: &TournamentDef) -> AppResult<ApplyOutcome> {
    let hours = hour_indices(&def.start, &def.end)?;
    let courts = enabled_courts(def.court1, def.court2)?;
    let value = SlotValue::Tournament {
        level: def.level.clone(),
        gender: def.gender.clone(),
    };
    Ok(apply_block(store, &[def.date], hours, &courts, value))
}

/// Outcome of re-deriving the store from a whole roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReapplySummary {
    pub applied: usize,
    pub rejected: usize,
}

/// Re-applies every practice definition. Definitions whose slots are
/// already taken (including by their own previous application) are counted
/// as rejected; a malformed row is logged and skipped.
pub fn reapply_practices(
    store: &mut BookingStore,
    defs: &[PracticeDef],
    horizon: &Horizon,
) -> ReapplySummary {
    let mut summary = ReapplySummary::default();
    for def in defs {
        match apply_practice(store, def, horizon) {
            Ok(ApplyOutcome::Applied { .. }) => summary.applied += 1,
            Ok(ApplyOutcome::Rejected(conflicts)) => {
                warn!(
                    "practice {} {}-{} not reapplied: {} conflicts",
                    def.weekday,
                    def.start,
                    def.end,
                    conflicts.len()
                );
                summary.rejected += 1;
            }
            Err(e) => {
                warn!("skipping practice row ({} {}): {}", def.weekday, def.start, e);
                summary.rejected += 1;
            }
        }
    }
    summary
}

/// Re-applies every tournament definition, same counting rules.
pub fn reapply_tournaments(store: &mut BookingStore, defs: &[TournamentDef]) -> ReapplySummary {
    let mut summary = ReapplySummary::default();
    for def in defs {
        match apply_tournament(store, def) {
            Ok(ApplyOutcome::Applied { .. }) => summary.applied += 1,
            Ok(ApplyOutcome::Rejected(conflicts)) => {
                warn!(
                    "tournament on {} not reapplied: {} conflicts",
                    def.date,
                    conflicts.len()
                );
                summary.rejected += 1;
            }
            Err(e) => {
                warn!("skipping tournament row ({}): {}", def.date, e);
                summary.rejected += 1;
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_renders_like_the_day_page() {
        let conflict = SlotConflict {
            date: NaiveDate::from_ymd_opt(2026, 3, 9).unwrap(),
            court: Court::Two,
            hour: 10,
        };
        assert_eq!(conflict.to_string(), "9/3/2026 - Terrain 2 - 18h");
    }

    #[test]
    fn horizon_year_covers_the_whole_year() {
        let horizon = Horizon::year(2026);
        assert_eq!(horizon.days().count(), 365);
        let mondays = horizon
            .days()
            .filter(|d| d.weekday() == chrono::Weekday::Mon)
            .count();
        assert_eq!(mondays, 52);
    }

    #[test]
    fn inverted_horizon_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        assert!(Horizon::new(start, end).is_err());
        assert!(Horizon::new(start, start).is_ok());
    }

    #[test]
    fn practice_without_court_or_coach_is_invalid() {
        let mut store = BookingStore::new();
        let mut def = PracticeDef {
            weekday: "Lundi".into(),
            start: "18:00".into(),
            end: "20:00".into(),
            coach: "Alice Martin".into(),
            level: "Débutant".into(),
            gender: "Mixte".into(),
            court1: false,
            court2: false,
        };
        let horizon = Horizon::year(2026);
        assert!(apply_practice(&mut store, &def, &horizon).is_err());
        def.court1 = true;
        def.coach = "  ".into();
        assert!(apply_practice(&mut store, &def, &horizon).is_err());
        assert_eq!(store, BookingStore::new());
    }
}
