use std::env;
use std::path::PathBuf;

use crate::booking::scheduler::Horizon;

/// Locations of the flat files everything persists to. The directory comes
/// from the DATA_DIR environment variable (default "data").
#[derive(Debug, Clone)]
pub struct DataFiles {
    pub dir: PathBuf,
}

impl DataFiles {
    pub fn from_env() -> DataFiles {
        let dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
        DataFiles { dir: PathBuf::from(dir) }
    }

    pub fn new(dir: impl Into<PathBuf>) -> DataFiles {
        DataFiles { dir: dir.into() }
    }

    /// The booking document (flat JSON mapping).
    pub fn bookings(&self) -> PathBuf {
        self.dir.join("responsables.json")
    }

    pub fn members(&self) -> PathBuf {
        self.dir.join("membres.csv")
    }

    pub fn practices(&self) -> PathBuf {
        self.dir.join("entrainements.csv")
    }

    pub fn tournaments(&self) -> PathBuf {
        self.dir.join("tournois.csv")
    }
}

/// Scheduling horizon for recurring definitions: the PLANNING_YEAR
/// environment variable, or the 2026 season by default.
pub fn horizon_from_env() -> Horizon {
    let year = env::var("PLANNING_YEAR")
        .ok()
        .and_then(|y| y.parse().ok())
        .unwrap_or(2026);
    Horizon::year(year)
}
