//! Persistent, dense ranking of stories within backlogs.
//!
//! [`rank::Ranker`] holds the ordering logic and works against any
//! [`rank::RankStore`]. [`db::Database`] is the SQLite store and the usual
//! entry point for callers.

pub mod config;
pub mod db;
pub mod models;
pub mod rank;
