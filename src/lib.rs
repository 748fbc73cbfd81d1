//! Greedy academic timetable generation.
//!
//! A request (date range, subjects, rooms, time slots, holidays and optional
//! teachers) flows one way through the engine:
//!
//! normalize -> [`calendar`] -> [`demand`] -> [`solver`] -> [`report`]
//!
//! The result is a conflict-free list of [`data::ScheduledEntry`] values plus
//! a [`data::Conflict`] for every subject/week/session type whose demand
//! could not be placed. The engine never returns an error.

pub mod calendar;
pub mod config;
pub mod data;
pub mod demand;
pub mod normalize;
pub mod report;
pub mod server;
pub mod solver;

pub use data::{TimetableOutput, TimetableRequest};
pub use solver::generate_timetable;
