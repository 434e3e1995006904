//! The pure/async computation layer: rating kernel, round grouper, decay
//! operator, team-strength resolver, rating tracker, and round processor
//! model for one full rebuild pass.

pub mod decay;
pub mod kernel;
pub mod rating_tracker;
pub mod round_processor;
pub mod rounds;
pub mod team_strength;
