//! Core value types shared across the crate.
//!
//! - [`time`]: the [`Time`] instant used by every clock, timer, and combinator.

pub mod time;

pub use time::Time;
