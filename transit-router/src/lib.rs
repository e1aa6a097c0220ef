//! Timetabled transit route planner.
//!
//! Answers: "leaving this station at this time, how do I reach each other
//! station as early as possible?"

pub mod cache;
pub mod domain;
pub mod network;
pub mod planner;
pub mod web;
