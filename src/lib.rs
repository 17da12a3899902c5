//! Taskflow - recurring task and habit tracking
//!
//! The library holds the scheduling core and the plumbing around it:
//!
//! * [`recurrence`] - which tasks apply on a given date
//! * [`completion`] - completion records and per-day scores
//! * [`color`] - hex colors and score-to-color mixing
//! * [`session`] - the owned state container and its operations
//! * [`storage`] - JSON persistence, export and import
//! * [`sync`] - remote backup push/pull
//! * [`config`], [`logger`] - ambient configuration and logging
//! * [`commands`], [`tui`] - the terminal front ends

pub mod color;
pub mod commands;
pub mod completion;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod recurrence;
pub mod session;
pub mod storage;
pub mod sync;
pub mod tui;
