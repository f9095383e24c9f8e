//! rxaide — local-first medication reminder and adherence tracking.
//!
//! Library surface: entities ([`models`]), the SQLite data access layer
//! ([`db`]), live-query plumbing ([`live`]), and the repository and
//! application state holder ([`core`]).

pub mod core;
pub mod db;
pub mod live;
pub mod models;
pub mod output;
