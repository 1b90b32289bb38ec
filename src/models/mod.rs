//! Core data models for the club: players, matches, rounds and tournaments.

mod ids;
mod matches;
mod player;
mod points;
mod round;
mod tournament;

pub use ids::*;
pub use matches::*;
pub use player::*;
pub use points::*;
pub use round::*;
pub use tournament::*;
