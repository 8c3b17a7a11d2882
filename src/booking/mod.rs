pub mod events;
pub mod occupancy;
pub mod scheduler;
pub mod slot;
pub mod store;

pub use scheduler::{apply_practice, apply_tournament, ApplyOutcome, Horizon};
pub use store::{BookingStore, SlotValue};
