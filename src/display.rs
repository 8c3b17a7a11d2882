use chrono::{Datelike, NaiveDate};

use crate::booking::occupancy::{slot_occupancy, FillBand};
use crate::booking::scheduler::ReapplySummary;
use crate::booking::slot::{slot_start_hour, Court, HOURS_PER_DAY};
use crate::booking::store::{BookingStore, SlotValue};

/// Day-page heading, e.g. "Lundi 9 mars 2026".
pub fn french_day_title(date: NaiveDate) -> String {
    const DAYS: [&str; 7] = [
        "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche",
    ];
    const MONTHS: [&str; 12] = [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
        "octobre", "novembre", "décembre",
    ];
    format!(
        "{} {} {} {}",
        DAYS[date.weekday().num_days_from_monday() as usize],
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Renders one court value for the terminal.
pub fn format_court(value: &SlotValue) -> String {
    match value {
        SlotValue::Free => "libre".to_string(),
        SlotValue::Staffer(name) => name.clone(),
        SlotValue::Practice {
            coach,
            gender,
            level,
        } => format!("🏐 Entrainement {} - {} (coach {})", gender, level, coach),
        SlotValue::Tournament { level, gender } => format!("🏆 Tournoi {} - {}", level, gender),
    }
}

/// Prints the 14-slot grid of one day, with the fill emoji of open slots.
pub fn print_day(store: &BookingStore, date: NaiveDate) {
    println!("\n=== Créneaux du {} ===", date.format("%d/%m/%Y"));
    for hour in 0..HOURS_PER_DAY {
        let start = slot_start_hour(hour);
        let emoji = slot_occupancy(store, date, hour)
            .map(|occ| FillBand::from_percentage(occ.percentage).emoji())
            .unwrap_or("");
        println!("🕒 {:02}:00 - {:02}:00 {}", start, start + 1, emoji);
        println!("  Terrain 1: {}", format_court(&store.court(date, hour, Court::One)));
        println!("  Terrain 2: {}", format_court(&store.court(date, hour, Court::Two)));
        if let Some(occ) = slot_occupancy(store, date, hour) {
            println!("  {}/{} places occupées", occ.occupied, occ.capacity);
        }
    }
}

/// Prints the result of a "reapply all" run.
pub fn print_reapply_summary(practices: &ReapplySummary, tournaments: &ReapplySummary) {
    println!("\n=== Réapplication des plannings ===");
    println!(
        "Entraînements : {} appliqués, {} en conflit",
        practices.applied, practices.rejected
    );
    println!(
        "Tournois      : {} appliqués, {} en conflit",
        tournaments.applied, tournaments.rejected
    );
}
