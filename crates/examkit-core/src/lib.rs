//! examkit-core — Exam session engine and review scoring.
//!
//! This crate defines the data model, the live-attempt state machine, and
//! the pure derivation logic (part ordering, progress, review statistics)
//! that the rest of examkit builds on.

pub mod engine;
pub mod error;
pub mod model;
pub mod organizer;
pub mod progress;
pub mod review;
pub mod session;
pub mod traits;
