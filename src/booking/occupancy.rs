use chrono::NaiveDate;
use serde::Serialize;

use crate::booking::slot::Court;
use crate::booking::store::BookingStore;

/// Read-side summary of one open slot, consumed by the presentation layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlotOccupancy {
    pub open_courts: u32,
    pub staffer_count: u32,
    pub capacity: u32,
    pub occupied: u32,
    pub percentage: f64,
}

/// Computes the occupancy of an open slot. Returns None when the slot is
/// blocked by a practice or tournament, or when no court is staffed.
pub fn slot_occupancy(store: &BookingStore, date: NaiveDate, hour: u8) -> Option<SlotOccupancy> {
    for court in Court::ALL {
        if store.court(date, hour, court).is_block() {
            return None;
        }
    }
    let open_courts = store.open_courts(date, hour);
    if open_courts == 0 {
        return None;
    }
    let staffer_count = store.responsible_staffers(date, hour).len() as u32;
    let capacity = store.effective_capacity(date, hour);
    let occupied = staffer_count + store.players(date, hour).len() as u32;
    let percentage = if capacity > 0 {
        occupied as f64 / capacity as f64 * 100.0
    } else {
        0.0
    };
    Some(SlotOccupancy {
        open_courts,
        staffer_count,
        capacity,
        occupied,
        percentage,
    })
}

/// Discrete fill level of an open slot. Bands are half-open except the top;
/// anything at or above 100% is Full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FillBand {
    Low,
    Moderate,
    Busy,
    High,
    Full,
}

impl FillBand {
    pub fn from_percentage(pct: f64) -> FillBand {
        if pct >= 100.0 {
            FillBand::Full
        } else if pct <= 25.0 {
            FillBand::Low
        } else if pct < 50.0 {
            FillBand::Moderate
        } else if pct < 75.0 {
            FillBand::Busy
        } else {
            FillBand::High
        }
    }

    /// Calendar display color (pastel palette of the club site).
    pub fn color(self) -> &'static str {
        match self {
            FillBand::Low => "#BBF7D0",
            FillBand::Moderate => "#FEF3C7",
            FillBand::Busy => "#FDBA74",
            FillBand::High => "#FECACA",
            FillBand::Full => "#D1D5DB",
        }
    }

    /// Status emoji shown next to the slot time on the day page.
    pub fn emoji(self) -> &'static str {
        match self {
            FillBand::Low => "🟢",
            FillBand::Moderate => "🟡",
            FillBand::Busy => "🟠",
            FillBand::High | FillBand::Full => "🔴",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::slot::Court;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn banding_is_total_over_boundary_values() {
        let cases = [
            (0.0, FillBand::Low),
            (25.0, FillBand::Low),
            (25.01, FillBand::Moderate),
            (49.99, FillBand::Moderate),
            (50.0, FillBand::Busy),
            (74.99, FillBand::Busy),
            (75.0, FillBand::High),
            (99.99, FillBand::High),
            (100.0, FillBand::Full),
        ];
        for (pct, band) in cases {
            assert_eq!(FillBand::from_percentage(pct), band, "at {}%", pct);
        }
    }

    #[test]
    fn over_full_percentages_still_band_as_full() {
        assert_eq!(FillBand::from_percentage(112.5), FillBand::Full);
        assert_eq!(FillBand::from_percentage(1000.0), FillBand::Full);
    }

    #[test]
    fn occupancy_grows_with_enrollment() {
        let mut store = BookingStore::new();
        let d = date(2026, 7, 4);
        store.assign_staffer(d, 6, Court::One, "Jean").unwrap();

        let mut previous = -1.0;
        for n in 0..10u32 {
            let players: Vec<String> = (0..n).map(|i| format!("Joueur {}", i)).collect();
            store.set_players(d, 6, players);
            let occ = slot_occupancy(&store, d, 6).unwrap();
            assert!(occ.percentage >= previous, "occupancy must be monotonic");
            previous = occ.percentage;
        }
        // 1 staffer + 9 players on an 8-seat court: over-full, still Full.
        let occ = slot_occupancy(&store, d, 6).unwrap();
        assert!(occ.percentage > 100.0);
        assert_eq!(FillBand::from_percentage(occ.percentage), FillBand::Full);
    }

    #[test]
    fn blocked_or_unstaffed_slots_have_no_occupancy() {
        let mut store = BookingStore::new();
        let d = date(2026, 7, 4);
        assert!(slot_occupancy(&store, d, 0).is_none());

        store.set_court(
            d,
            0,
            Court::One,
            crate::booking::store::SlotValue::parse("ENTRAINEMENT|A|Mixte|Avancé"),
        );
        store.assign_staffer(d, 0, Court::Two, "Jean").unwrap();
        assert!(slot_occupancy(&store, d, 0).is_none());
    }
}
