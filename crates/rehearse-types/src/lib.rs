//! Shared types for the Rehearse interview simulator.

mod code;
mod interview;
mod outcome;

pub use code::*;
pub use interview::*;
pub use outcome::*;
