//! Simulation core for Dead Man's Party, a turn-based murder mystery.
//!
//! Suspects are spread across a handful of rooms. Some of them are murderers.
//! The player shuffles suspects between rooms, the lobby and the execution
//! chamber, then ends the day; at night one armed murderer may strike.
//! Everything here is a synchronous state machine driven by
//! [`engine::GameEngine`], with randomness injected through
//! [`rng::RandomSource`].

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod rng;
pub mod rooms;
pub mod types;
pub mod weapon;
pub mod world;
