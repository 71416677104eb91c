//! Short-lived note storage service
//!
//! Clients create notes that are either single-use (deleted by their first
//! read) or timed (readable until an expiration instant), and fetch them by
//! a random 21-character uid.

pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod handler;
pub mod model;
pub mod pruner;
pub mod route;
pub mod store;
pub mod uid;
