pub mod booking;
pub mod config;
pub mod display;
pub mod error;
pub mod roster;
pub mod web;
