//! Domain models for backlog ranking.
//!
//! # Core Concepts
//!
//! - [`RankEntry`]: One story's position within one backlog. Positions in a
//!   backlog are always dense and zero-based after any ranking operation.
//! - [`Placement`]: A requested spot for a story, relative to another story or
//!   to one end of the backlog.

mod entry;
mod placement;

pub use entry::*;
pub use placement::*;
