//! Timestamp-continuity merging for rotated Vector ASC CAN-bus logs.
//!
//! A long capture session is usually split across several `.asc` files by
//! file-size rotation, with each file restarting its timestamps near zero.
//! This crate concatenates such a directory back into one log: the first
//! file's header is kept, every later header is dropped, and each data line's
//! leading timestamp is shifted by the last timestamp of the files merged
//! before it so elapsed time is continuous across file boundaries. The
//! rewritten timestamp keeps the original token's decimal precision and
//! column width, so the payload columns stay aligned.

mod error;
mod merge;
mod timestamp;

pub mod config;

pub use error::*;
pub use merge::*;
pub use timestamp::*;
