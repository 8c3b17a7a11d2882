//! Unified application error type.
//! Every module (booking, roster, web, cli) returns AppError so the handlers
//! only have one failure surface to translate.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // The booking document exists but is not valid JSON. Corruption is
    // surfaced instead of being discarded as an empty store.
    #[error("booking document {path} is corrupt: {source}")]
    CorruptStore {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // The document on disk moved past the revision we loaded; saving would
    // silently clobber another writer's changes.
    #[error("booking document changed on disk (loaded revision {loaded}, found {found})")]
    StaleStore { loaded: u64, found: u64 },

    #[error("unknown weekday name: {0}")]
    UnknownWeekday(String),

    #[error("invalid time: {0}")]
    InvalidTime(String),

    #[error("invalid slot range {range}: must end after it starts and stay within {min}:00-{max}:00")]
    InvalidHourRange { range: String, min: u8, max: u8 },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("court {court} on {date} at {hour}h is blocked by a practice or tournament")]
    SlotBlocked { date: String, hour: u8, court: u8 },

    #[error("no open court on {date} at {hour}h")]
    NoOpenCourt { date: String, hour: u8 },

    #[error("validation error: {0}")]
    Validation(String),
}

pub type AppResult<T> = Result<T, AppError>;
