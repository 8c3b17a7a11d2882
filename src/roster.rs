use std::fs::{self, OpenOptions};
use std::path::Path;

use chrono::NaiveDate;
use csv::{Reader, WriterBuilder};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::booking::slot::weekday_order;
use crate::error::AppResult;

/// Parses a boolean flag from the roster files ("oui", "Oui", "yes", "1"...).
fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "oui" || lower == "yes" || lower == "true" || lower == "1"
}

// Court flags are stored as "oui"/"non" in the CSV rosters.
mod oui_non {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "oui" } else { "non" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(super::parse_bool(&raw))
    }
}

/// One row of the member roster (data/membres.csv).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(with = "oui_non")]
    pub staffer: bool,
    #[serde(with = "oui_non")]
    pub coach: bool,
}

impl Member {
    /// Display name used everywhere: "prenom nom".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Names of members allowed to be responsible for a court.
pub fn staffer_names(members: &[Member]) -> Vec<String> {
    members
        .iter()
        .filter(|m| m.staffer)
        .map(Member::full_name)
        .collect()
}

/// Names of members allowed to lead a practice session.
pub fn coach_names(members: &[Member]) -> Vec<String> {
    members
        .iter()
        .filter(|m| m.coach)
        .map(Member::full_name)
        .collect()
}

/// A weekly recurring practice definition (one row of entrainements.csv).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeDef {
    #[serde(rename = "jour")]
    pub weekday: String,
    #[serde(rename = "heure_debut")]
    pub start: String,
    #[serde(rename = "heure_fin")]
    pub end: String,
    pub coach: String,
    #[serde(rename = "niveau")]
    pub level: String,
    #[serde(rename = "genre")]
    pub gender: String,
    #[serde(rename = "terrain1", with = "oui_non")]
    pub court1: bool,
    #[serde(rename = "terrain2", with = "oui_non")]
    pub court2: bool,
}

/// A one-off tournament definition (one row of tournois.csv).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentDef {
    pub date: NaiveDate,
    #[serde(rename = "heure_debut")]
    pub start: String,
    #[serde(rename = "heure_fin")]
    pub end: String,
    #[serde(rename = "niveau")]
    pub level: String,
    #[serde(rename = "genre")]
    pub gender: String,
    #[serde(rename = "terrain1", with = "oui_non")]
    pub court1: bool,
    #[serde(rename = "terrain2", with = "oui_non")]
    pub court2: bool,
}

// Missing roster files are an empty state, not a failure: the pages show a
// notice and keep working.
fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> AppResult<Vec<T>> {
    if !path.exists() {
        warn!("roster file {} not found, treating as empty", path.display());
        return Ok(Vec::new());
    }
    let mut reader = Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

pub fn load_members(path: &Path) -> AppResult<Vec<Member>> {
    read_rows(path)
}

/// Loads the practice roster, ordered by weekday (Monday first) then start.
pub fn load_practices(path: &Path) -> AppResult<Vec<PracticeDef>> {
    let mut defs: Vec<PracticeDef> = read_rows(path)?;
    defs.sort_by(|a, b| {
        (weekday_order(&a.weekday), a.start.as_str()).cmp(&(weekday_order(&b.weekday), b.start.as_str()))
    });
    Ok(defs)
}

/// Loads the tournament roster, ordered by date then start.
pub fn load_tournaments(path: &Path) -> AppResult<Vec<TournamentDef>> {
    let mut defs: Vec<TournamentDef> = read_rows(path)?;
    defs.sort_by(|a, b| (a.date, a.start.as_str()).cmp(&(b.date, b.start.as_str())));
    Ok(defs)
}

// Rosters are append-only from the UI: create with header on first write,
// then append one row per accepted definition.
fn append_row<T: Serialize>(path: &Path, row: &T) -> AppResult<()> {
    let exists = path.exists();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = WriterBuilder::new().has_headers(!exists).from_writer(file);
    writer.serialize(row)?;
    writer.flush()?;
    Ok(())
}

pub fn append_practice(path: &Path, def: &PracticeDef) -> AppResult<()> {
    append_row(path, def)
}

pub fn append_tournament(path: &Path, def: &TournamentDef) -> AppResult<()> {
    append_row(path, def)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_flags_parse_leniently() {
        assert!(parse_bool("Oui"));
        assert!(parse_bool("oui"));
        assert!(parse_bool(" 1 "));
        assert!(!parse_bool("non"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn role_filters_use_full_names() {
        let members = vec![
            Member {
                first_name: "Jean".into(),
                last_name: "Dupont".into(),
                staffer: true,
                coach: false,
            },
            Member {
                first_name: "Alice".into(),
                last_name: "Martin".into(),
                staffer: true,
                coach: true,
            },
        ];
        assert_eq!(staffer_names(&members), vec!["Jean Dupont", "Alice Martin"]);
        assert_eq!(coach_names(&members), vec!["Alice Martin"]);
    }
}
