//! # Swiss Club
//!
//! Swiss-system chess tournament manager for a club.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, matches, rounds, tournaments)
//! - **pairing**: Random first round, score-group pairing afterwards
//! - **registry**: The club's player list and lifetime points
//! - **storage**: JSON files on disk, rewritten atomically
//! - **runner**: Round-by-round play with crash resume
//! - **report**: Plain-text listings and tournament reports
//! - **config**: Configuration loading and validation

pub mod config;
pub mod dates;
pub mod models;
pub mod pairing;
pub mod registry;
pub mod report;
pub mod runner;
pub mod storage;

pub use models::*;
