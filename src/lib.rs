//! Cafe Story Engine — narrative progression for a cafe-management game.
//!
//! Decides which authored chapter or ad-hoc daily scene plays next, walks
//! branching event graphs and applies their effect bundles, maps accumulated
//! affection and glamor points to discrete levels with one-shot change
//! signals, and classifies a finished playthrough into exactly one ending.

pub mod core;
pub mod schema;
