use crate::error::{AppError, AppResult};
use chrono::{Datelike, NaiveDate, Weekday};

/// The day grid starts at 08:00.
pub const FIRST_HOUR: u8 = 8;
/// 14 one-hour slots per day (08:00 to 22:00).
pub const HOURS_PER_DAY: u8 = 14;
/// Maximum players a single court can take.
pub const COURT_CAPACITY: u32 = 8;

/// One of the two club courts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Court {
    One,
    Two,
}

impl Court {
    pub const ALL: [Court; 2] = [Court::One, Court::Two];

    pub fn number(self) -> u8 {
        match self {
            Court::One => 1,
            Court::Two => 2,
        }
    }

    /// Key suffix used in the booking document ("terrain1" / "terrain2").
    pub fn suffix(self) -> &'static str {
        match self {
            Court::One => "terrain1",
            Court::Two => "terrain2",
        }
    }

    pub fn from_number(n: u8) -> Option<Court> {
        match n {
            1 => Some(Court::One),
            2 => Some(Court::Two),
            _ => None,
        }
    }
}

// Keys are built with unpadded year/month/day/hour, matching the documents
// already in the field.
fn key_prefix(date: NaiveDate, hour: u8) -> String {
    format!("{}-{}-{}-{}", date.year(), date.month(), date.day(), hour)
}

/// Canonical key for a (date, hour-index, court) triple.
pub fn court_key(date: NaiveDate, hour: u8, court: Court) -> String {
    format!("{}-{}", key_prefix(date, hour), court.suffix())
}

/// Key holding the seat-cap override for a slot.
pub fn capacity_key(date: NaiveDate, hour: u8) -> String {
    format!("{}-max_places", key_prefix(date, hour))
}

/// Key holding the enrolled-player list for a slot.
pub fn players_key(date: NaiveDate, hour: u8) -> String {
    format!("{}-joueurs", key_prefix(date, hour))
}

/// Wall-clock hour a slot index starts at.
pub fn slot_start_hour(index: u8) -> u8 {
    FIRST_HOUR + index
}

/// Parses an "HH:MM" string into the hour component.
fn parse_hour(time: &str) -> AppResult<u8> {
    let mut parts = time.split(':');
    let hours: u8 = parts
        .next()
        .and_then(|h| h.trim().parse().ok())
        .ok_or_else(|| AppError::InvalidTime(time.to_string()))?;
    if let Some(minutes) = parts.next() {
        let m: u8 = minutes
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidTime(time.to_string()))?;
        if m >= 60 {
            return Err(AppError::InvalidTime(time.to_string()));
        }
    }
    if hours >= 24 {
        return Err(AppError::InvalidTime(time.to_string()));
    }
    Ok(hours)
}

/// Converts a (start, end) "HH:MM" pair into the covered hour-index range.
/// An empty or out-of-grid range is rejected instead of silently producing
/// no slots.
pub fn hour_indices(start: &str, end: &str) -> AppResult<std::ops::Range<u8>> {
    let start_h = parse_hour(start)?;
    let end_h = parse_hour(end)?;
    let last = FIRST_HOUR + HOURS_PER_DAY;
    if start_h < FIRST_HOUR || end_h > last || end_h <= start_h {
        return Err(AppError::InvalidHourRange {
            range: format!("{}-{}", start, end),
            min: FIRST_HOUR,
            max: last,
        });
    }
    Ok(start_h - FIRST_HOUR..end_h - FIRST_HOUR)
}

/// Resolves a French weekday name (as stored in the practice roster) to a
/// chrono weekday. Case-insensitive; unknown names fail before any write.
pub fn weekday_from_french(name: &str) -> AppResult<Weekday> {
    match name.trim().to_lowercase().as_str() {
        "lundi" => Ok(Weekday::Mon),
        "mardi" => Ok(Weekday::Tue),
        "mercredi" => Ok(Weekday::Wed),
        "jeudi" => Ok(Weekday::Thu),
        "vendredi" => Ok(Weekday::Fri),
        "samedi" => Ok(Weekday::Sat),
        "dimanche" => Ok(Weekday::Sun),
        _ => Err(AppError::UnknownWeekday(name.to_string())),
    }
}

/// Ordering index used when listing practice definitions (Monday first).
pub fn weekday_order(name: &str) -> u8 {
    weekday_from_french(name)
        .map(|w| w.num_days_from_monday() as u8)
        .unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn keys_are_unpadded() {
        let d = date(2026, 3, 9);
        assert_eq!(court_key(d, 0, Court::One), "2026-3-9-0-terrain1");
        assert_eq!(court_key(d, 13, Court::Two), "2026-3-9-13-terrain2");
        assert_eq!(capacity_key(d, 5), "2026-3-9-5-max_places");
        assert_eq!(players_key(d, 5), "2026-3-9-5-joueurs");
    }

    #[test]
    fn hour_indices_cover_the_range() {
        let range = hour_indices("18:00", "20:00").unwrap();
        assert_eq!(range.collect::<Vec<_>>(), vec![10, 11]);
    }

    #[test]
    fn empty_or_inverted_range_is_rejected() {
        assert!(hour_indices("18:00", "18:00").is_err());
        assert!(hour_indices("20:00", "18:00").is_err());
    }

    #[test]
    fn out_of_grid_hours_are_rejected() {
        assert!(hour_indices("07:00", "10:00").is_err());
        assert!(hour_indices("20:00", "23:00").is_err());
        assert!(hour_indices("8:00", "22:00").is_ok());
    }

    #[test]
    fn french_weekdays_resolve() {
        assert_eq!(weekday_from_french("Lundi").unwrap(), Weekday::Mon);
        assert_eq!(weekday_from_french("dimanche").unwrap(), Weekday::Sun);
        assert!(weekday_from_french("funday").is_err());
    }
}
