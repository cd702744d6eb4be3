//! # Team Classifier
//!
//! Infers which faction each player fought for in a completed match from
//! their aggregate weapon kill counts, for admin views where the per-kill
//! team tag is no longer available.
//!
//! ## Architecture
//!
//! - **models**: Player kill records, weapon usage and team labels
//! - **taxonomy**: Versioned weapon-to-faction lookup table
//! - **classify**: The classification engine
//! - **storage**: JSON / JSONL statistics files
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod classify;
pub mod config;
pub mod models;
pub mod storage;
pub mod taxonomy;

pub use classify::{classify, classify_with, Classifier, ClassifierConfig, ZeroKillPolicy};
pub use models::*;
pub use taxonomy::{TaxonomyError, WeaponTaxonomy};
