//! Core domain layer for tutor-charts.
//!
//! Holds the cell-value model, the column schema resolver, the value
//! normalizers (time-of-day, duration, month key, semester label), the
//! time-slot classifier and the shared configuration and error types.

pub mod error;
pub mod models;
pub mod normalize;
pub mod schema;
pub mod settings;
pub mod timeslot;
