//! Core data models for the team classifier.

mod player;
mod team;
mod usage;

pub use player::*;
pub use team::*;
pub use usage::*;
