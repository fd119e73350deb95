//! Rehearse server library: HTTP routes, configuration and application state
//! for the interview simulator. Split from main.rs for integration testing.

pub mod config;
pub mod logging;
pub mod routes;
pub mod state;
