use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use log::warn;
use serde_json::{Map, Value};

use crate::booking::slot::{capacity_key, court_key, players_key, Court, COURT_CAPACITY};
use crate::error::{AppError, AppResult};

pub const PRACTICE_TAG: &str = "ENTRAINEMENT";
pub const TOURNAMENT_TAG: &str = "TOURNOI";

// Reserved key in the booking document; everything else is a slot key.
const REVISION_KEY: &str = "__revision";

/// What a single court holds for one hour slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    Free,
    /// Open slot with a responsible staffer.
    Staffer(String),
    /// Blocked by a recurring practice session.
    Practice {
        coach: String,
        gender: String,
        level: String,
    },
    /// Blocked by a tournament.
    Tournament { level: String, gender: String },
}

impl SlotValue {
    /// Parses the raw string stored in the booking document.
    pub fn parse(raw: &str) -> SlotValue {
        if raw.is_empty() {
            return SlotValue::Free;
        }
        let parts: Vec<&str> = raw.split('|').collect();
        match parts[0] {
            PRACTICE_TAG => SlotValue::Practice {
                coach: parts.get(1).unwrap_or(&"").to_string(),
                gender: parts.get(2).unwrap_or(&"").to_string(),
                level: parts.get(3).unwrap_or(&"").to_string(),
            },
            TOURNAMENT_TAG => SlotValue::Tournament {
                level: parts.get(1).unwrap_or(&"").to_string(),
                gender: parts.get(2).unwrap_or(&"").to_string(),
            },
            _ => SlotValue::Staffer(raw.to_string()),
        }
    }

    /// Renders the value back to the document's string form.
    /// Note the field order differs between the two block tags.
    pub fn to_tag(&self) -> String {
        match self {
            SlotValue::Free => String::new(),
            SlotValue::Staffer(name) => name.clone(),
            SlotValue::Practice {
                coach,
                gender,
                level,
            } => format!("{}|{}|{}|{}", PRACTICE_TAG, coach, gender, level),
            SlotValue::Tournament { level, gender } => {
                format!("{}|{}|{}", TOURNAMENT_TAG, level, gender)
            }
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, SlotValue::Free)
    }

    /// True for practice and tournament blocks.
    pub fn is_block(&self) -> bool {
        matches!(self, SlotValue::Practice { .. } | SlotValue::Tournament { .. })
    }
}

/// The whole booking state: one flat JSON document on disk, split by key
/// shape into three typed maps in memory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BookingStore {
    courts: BTreeMap<String, SlotValue>,
    capacities: BTreeMap<String, u32>,
    players: BTreeMap<String, Vec<String>>,
    revision: u64,
}

impl BookingStore {
    pub fn new() -> BookingStore {
        BookingStore::default()
    }

    /// Loads the booking document. A missing file is an empty store; a file
    /// that fails to parse is reported as corrupt rather than discarded.
    pub fn load(path: &Path) -> AppResult<BookingStore> {
        if !path.exists() {
            return Ok(BookingStore::default());
        }
        let raw = fs::read_to_string(path)?;
        let doc: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|e| AppError::CorruptStore {
                path: path.display().to_string(),
                source: e,
            })?;

        let mut store = BookingStore::default();
        for (key, value) in doc {
            if key == REVISION_KEY {
                store.revision = value.as_u64().unwrap_or(0);
            } else if key.ends_with("-terrain1") || key.ends_with("-terrain2") {
                match value.as_str() {
                    Some(s) => {
                        store.courts.insert(key, SlotValue::parse(s));
                    }
                    None => warn!("skipping non-string court value at {}", key),
                }
            } else if key.ends_with("-max_places") {
                match value.as_u64() {
                    Some(n) => {
                        store.capacities.insert(key, n as u32);
                    }
                    None => warn!("skipping non-integer capacity at {}", key),
                }
            } else if key.ends_with("-joueurs") {
                match value.as_array() {
                    Some(list) => {
                        let names = list
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect();
                        store.players.insert(key, names);
                    }
                    None => warn!("skipping non-list player entry at {}", key),
                }
            } else {
                warn!("skipping unknown key shape: {}", key);
            }
        }
        Ok(store)
    }

    /// Rewrites the whole document. Fails when the file's revision moved
    /// past the one loaded, so a concurrent writer is detected instead of
    /// silently clobbered.
    pub fn save(&mut self, path: &Path) -> AppResult<()> {
        if path.exists() {
            let raw = fs::read_to_string(path)?;
            match serde_json::from_str::<Value>(&raw) {
                Ok(doc) => {
                    let found = doc.get(REVISION_KEY).and_then(|v| v.as_u64()).unwrap_or(0);
                    if found != self.revision {
                        return Err(AppError::StaleStore {
                            loaded: self.revision,
                            found,
                        });
                    }
                }
                // The file was already unreadable; last write wins.
                Err(e) => warn!("overwriting unparseable booking document: {}", e),
            }
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        self.revision += 1;
        let mut doc = Map::new();
        for (key, value) in &self.courts {
            doc.insert(key.clone(), Value::String(value.to_tag()));
        }
        for (key, cap) in &self.capacities {
            doc.insert(key.clone(), Value::from(*cap));
        }
        for (key, names) in &self.players {
            doc.insert(key.clone(), Value::from(names.clone()));
        }
        doc.insert(REVISION_KEY.to_string(), Value::from(self.revision));

        fs::write(path, serde_json::to_string_pretty(&Value::Object(doc))?)?;
        Ok(())
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn court(&self, date: NaiveDate, hour: u8, court: Court) -> SlotValue {
        self.courts
            .get(&court_key(date, hour, court))
            .cloned()
            .unwrap_or(SlotValue::Free)
    }

    pub fn set_court(&mut self, date: NaiveDate, hour: u8, court: Court, value: SlotValue) {
        self.courts.insert(court_key(date, hour, court), value);
    }

    pub fn is_occupied(&self, date: NaiveDate, hour: u8, court: Court) -> bool {
        !self.court(date, hour, court).is_free()
    }

    pub fn capacity_override(&self, date: NaiveDate, hour: u8) -> Option<u32> {
        self.capacities.get(&capacity_key(date, hour)).copied()
    }

    pub fn set_capacity_override(&mut self, date: NaiveDate, hour: u8, cap: u32) {
        self.capacities.insert(capacity_key(date, hour), cap);
    }

    pub fn players(&self, date: NaiveDate, hour: u8) -> Vec<String> {
        self.players
            .get(&players_key(date, hour))
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_players(&mut self, date: NaiveDate, hour: u8, names: Vec<String>) {
        self.players.insert(players_key(date, hour), names);
    }

    /// Distinct responsible staffers across both courts (the same person
    /// running both courts counts once).
    pub fn responsible_staffers(&self, date: NaiveDate, hour: u8) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for court in Court::ALL {
            if let SlotValue::Staffer(name) = self.court(date, hour, court) {
                let name = name.trim();
                if !name.is_empty()
                    && !out.iter().any(|n| n.to_lowercase() == name.to_lowercase())
                {
                    out.push(name.to_string());
                }
            }
        }
        out
    }

    /// Courts currently open for ad-hoc play (staffed, not blocked).
    pub fn open_courts(&self, date: NaiveDate, hour: u8) -> u32 {
        Court::ALL
            .iter()
            .filter(|c| matches!(self.court(date, hour, **c), SlotValue::Staffer(_)))
            .count() as u32
    }

    /// Effective seat cap for a slot:
    /// max(staffer-count, min(override, open-courts x 8)).
    pub fn effective_capacity(&self, date: NaiveDate, hour: u8) -> u32 {
        let open = self.open_courts(date, hour);
        if open == 0 {
            return 0;
        }
        let hard_cap = open * COURT_CAPACITY;
        let staffers = self.responsible_staffers(date, hour).len() as u32;
        let current = self.capacity_override(date, hour).unwrap_or(hard_cap);
        staffers.max(current.min(hard_cap))
    }

    /// Assigns (or, with an empty name, frees) the responsible staffer of a
    /// court. Courts held by a practice or tournament cannot be reassigned.
    pub fn assign_staffer(
        &mut self,
        date: NaiveDate,
        hour: u8,
        court: Court,
        name: &str,
    ) -> AppResult<()> {
        if self.court(date, hour, court).is_block() {
            return Err(AppError::SlotBlocked {
                date: date.to_string(),
                hour,
                court: court.number(),
            });
        }
        let name = name.trim();
        let value = if name.is_empty() {
            SlotValue::Free
        } else {
            SlotValue::Staffer(name.to_string())
        };
        self.set_court(date, hour, court, value);
        Ok(())
    }

    /// Replaces the enrolled-player list of a slot. Responsible staffers are
    /// removed from the list (they already count toward occupancy), the
    /// rest is deduplicated and truncated to the remaining capacity.
    /// Returns the list actually stored.
    pub fn enroll_players(
        &mut self,
        date: NaiveDate,
        hour: u8,
        names: &[String],
    ) -> AppResult<Vec<String>> {
        if self.open_courts(date, hour) == 0 {
            return Err(AppError::NoOpenCourt {
                date: date.to_string(),
                hour,
            });
        }
        let staffers = self.responsible_staffers(date, hour);
        let capacity = self.effective_capacity(date, hour);
        let room = capacity.saturating_sub(staffers.len() as u32) as usize;

        let mut kept: Vec<String> = Vec::new();
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let lower = name.to_lowercase();
            let is_staffer = staffers.iter().any(|s| s.to_lowercase() == lower);
            let seen = kept.iter().any(|k| k.to_lowercase() == lower);
            if !is_staffer && !seen {
                kept.push(name.to_string());
            }
        }
        kept.truncate(room);
        self.set_players(date, hour, kept.clone());
        Ok(kept)
    }
}
